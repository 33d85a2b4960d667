//! Environment abstraction for deterministic testing.
//!
//! Decouples session and notification logic from system resources (time,
//! randomness). Production uses the real clock and OS entropy; the harness
//! uses a virtual clock and a seeded RNG so runs are reproducible.

use std::time::Duration;

/// Abstract environment providing time, randomness, and async primitives.
///
/// # Invariants
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` given the same seed produces the same sequence in
///   simulation
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    type Instant: Copy + Ord + Send + Sync + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code should await this, never state machine logic.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Seconds since the Unix epoch, used to timestamp notifications.
    fn wall_clock_secs(&self) -> u64;

    /// Generates a random `u128`.
    fn random_u128(&self) -> u128 {
        let mut bytes = [0u8; 16];
        self.random_bytes(&mut bytes);
        u128::from_be_bytes(bytes)
    }

    /// Generates an uppercase version 4 UUID from this environment's
    /// randomness.
    ///
    /// Used for one-shot notification request identifiers.
    fn unique_id(&self) -> String {
        format_uuid(self.random_u128())
    }
}

/// Format random bits as an uppercase version 4 UUID.
pub fn format_uuid(random: u128) -> String {
    let uuid = uuid::Builder::from_random_bytes(random.to_be_bytes()).into_uuid();
    uuid.hyphenated().to_string().to_uppercase()
}

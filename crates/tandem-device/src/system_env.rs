//! Environment backed by the system clock and OS entropy.
//!
//! Used by the demo binary. Runs are not reproducible; the harness's seeded
//! environment covers that.

use std::time::Duration;

use tandem_core::Environment;

/// Real time, tokio sleeps and getrandom.
///
/// # Panics
///
/// Panics if the OS RNG fails. Notification identifiers come from this
/// randomness, and a device that cannot generate them cannot schedule
/// anything without collisions.
#[derive(Clone, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    #[allow(clippy::disallowed_methods)]
    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG failure is unrecoverable");
    }

    #[allow(clippy::disallowed_methods)]
    fn wall_clock_secs(&self) -> u64 {
        // A clock set before 1970 reads as the epoch
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::disallowed_methods, reason = "Exercises the real clock")]

    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1, "Time should advance");
    }

    #[test]
    fn identifiers_differ() {
        let env = SystemEnv::new();
        assert_ne!(env.unique_id(), env.unique_id());
    }

    #[test]
    fn wall_clock_is_past_2017() {
        assert!(SystemEnv::new().wall_clock_secs() > 1_484_000_000);
    }

    #[tokio::test]
    async fn sleep_waits() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_millis(50)).await;
        let elapsed = env.now() - start;

        assert!(elapsed >= Duration::from_millis(50), "Sleep should wait at least 50ms");
    }
}

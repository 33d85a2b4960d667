//! Deterministic simulation harness for tandem.
//!
//! Seeded, virtual-clock implementations of the environment, notification
//! center, asset fetcher and presentation driver, plus [`SimPair`], a host
//! and companion wired together over the in-memory link.
//!
//! # Invariant Testing
//!
//! The `invariants` module extracts observable state from the host and
//! companion screens and checks behavioral properties against it. Attach
//! [`InvariantRegistry::standard()`] to a [`SimDriver`] to check after every
//! render.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod invariants;
pub mod sim_center;
pub mod sim_driver;
pub mod sim_env;
pub mod sim_pair;
pub mod static_fetcher;

pub use invariants::{
    CompanionSnapshot, HostControlsMatchMode, HostSnapshot, Invariant, InvariantKind,
    InvariantRegistry, InvariantResult, ModeConvergence, SystemSnapshot, Violation,
    VisibilityMatchesPending,
};
pub use sim_center::SimNotificationCenter;
pub use sim_driver::{Frame, SimDriver, SimDriverError};
pub use sim_env::{SIM_EPOCH_SECS, SimEnv, SimInstant};
pub use sim_pair::{SimCompanion, SimHost, SimPair};
pub use static_fetcher::{StaticFetcher, TINY_JPEG};

//! Connectivity Core
//!
//! Session plumbing between a host device and its paired companion: the
//! transport seam, the connectivity manager that owns every outbound send,
//! pluggable per-role behaviors for inbound traffic, and the persisted mode
//! setting.
//!
//! # Architecture
//!
//! Transports are wrapped behind [`SessionTransport`]. Everything the transport
//! observes (activation, deactivation, inbound messages) is pushed into one
//! ordered stream of [`SessionEvent`]s that the [`ConnectivityManager`]
//! consumes. Outbound sends are commands issued to the transport; results come
//! back through completion handlers.
//!
//! Sends made before the session activates can be queued. On activation the
//! queue replays in enqueue order, exactly once.
//!
//! # Components
//!
//! - [`ConnectivityManager`]: send policy, pending queue, inbound dispatch
//! - [`ConnectivityBehavior`]: role-specific send gate and inbound handlers
//! - [`ModeStore`]: typed view over the persisted `CurrentMode` setting
//! - [`Environment`]: time and randomness, swapped for a seeded one in tests
//! - [`memory`]: linked in-memory transport pair

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod behavior;
pub mod env;
mod error;
mod manager;
pub mod memory;
mod session;
mod store;

pub use behavior::{ConnectivityBehavior, Disposition, dispatch_data, dispatch_message};
pub use env::Environment;
pub use error::{ConnectivityError, StoreError, TransportError};
pub use manager::{ConnectivityManager, DropReason, SendOptions, SendOutcome};
pub use session::{
    ActivationState, DataReplyHandler, ErrorHandler, MessageReplyHandler, SessionEvent,
    SessionStatus, SessionTransport,
};
pub use store::{CURRENT_MODE_KEY, MemorySettings, ModeStore, SettingsStore};

//! Tandem demo device.
//!
//! Production glue around the pure connectivity and app logic: the system
//! environment, a redb settings backend, an HTTP attachment fetcher, a
//! timer-driven notification center and a driver that renders to the log.
//! [`run_demo`] wires a host and a companion together over the in-memory link
//! and plays a short scripted session.
//!
//! # Components
//!
//! - [`SystemEnv`]: real clock, tokio sleeps, OS entropy
//! - [`RedbSettings`]: durable `CurrentMode` setting
//! - [`HttpAssetFetcher`]: attachment images over HTTPS
//! - [`TimerNotificationCenter`]: local notifications on tokio timers
//! - [`LogDriver`]: screens and transitions as log lines

#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod center;
mod config;
mod demo;
mod error;
mod fetcher;
mod log_driver;
mod settings;
mod system_env;

pub use center::TimerNotificationCenter;
pub use config::{DeviceConfig, Role, ScriptedResponse};
pub use demo::{DemoReport, run_demo};
pub use error::DeviceError;
pub use fetcher::{DEFAULT_FETCH_TIMEOUT, HttpAssetFetcher};
pub use log_driver::{DriverStats, LogDriver};
pub use settings::RedbSettings;
pub use system_env::SystemEnv;

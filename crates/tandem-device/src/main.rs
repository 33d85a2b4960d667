//! Tandem demo binary.
//!
//! # Usage
//!
//! ```bash
//! # Host selects primary, companion answers with the modal action
//! tandem-demo --mode primary
//!
//! # Keep the host's mode between runs and fetch the attachment image
//! tandem-demo --settings host.redb --fetch-attachments
//!
//! # No paired-device support: both sides run alone
//! tandem-demo --unsupported-link
//! ```

use std::{path::PathBuf, time::Duration};

use clap::Parser;
use tandem_app::DEFAULT_ASSET_HOST;
use tandem_device::{DeviceConfig, Role, ScriptedResponse, run_demo};
use tandem_proto::Mode;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tandem paired-device demo
#[derive(Parser, Debug)]
#[command(name = "tandem-demo")]
#[command(about = "Scripted host and companion session over an in-memory link")]
#[command(version)]
struct Args {
    /// Side whose settings are stored in --settings
    #[arg(long, value_enum, default_value_t = Role::Host)]
    role: Role,

    /// Mode the host selects (undefined, primary, secondary). Omit to keep
    /// the stored mode
    #[arg(short, long)]
    mode: Option<Mode>,

    /// Settings database path
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Host serving attachment images
    #[arg(long, default_value = DEFAULT_ASSET_HOST)]
    asset_host: String,

    /// Download the attachment of the host's notification
    #[arg(long)]
    fetch_attachments: bool,

    /// Attachment request timeout in seconds
    #[arg(long, default_value = "15")]
    fetch_timeout_secs: u64,

    /// How the companion's notification is answered
    #[arg(long, value_enum, default_value_t = ScriptedResponse::Modal)]
    response: ScriptedResponse,

    /// Delay before the sessions activate, in milliseconds
    #[arg(long, default_value = "500")]
    activation_delay_ms: u64,

    /// Simulate a device without paired-device support
    #[arg(long)]
    unsupported_link: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    tracing::info!("Tandem demo starting");

    let config = DeviceConfig {
        role: args.role,
        initial_mode: args.mode,
        settings_path: args.settings,
        asset_host: args.asset_host,
        fetch_attachments: args.fetch_attachments,
        fetch_timeout: Duration::from_secs(args.fetch_timeout_secs),
        response: args.response,
        activation_delay: Duration::from_millis(args.activation_delay_ms),
        link_supported: !args.unsupported_link,
    };

    let report = run_demo(config).await?;

    tracing::info!(
        host = %report.host_mode,
        companion = %report.companion_mode,
        transitions = report.companion_transitions,
        "Modes after run"
    );

    Ok(())
}

#![forbid(unsafe_code)]

mod config;
mod constants;
mod daemon;
mod deps;
mod display_cache;
mod geometry;
mod process;
mod providers;
mod relocator;
mod sampler;
mod signals;
mod types;
mod zone;

use clap::Parser;
use tracing::{error, info, Level as TraceLevel};
use tracing_subscriber::FmtSubscriber;

use config::Settings;

/// Moves plank to whichever monitor the cursor approaches from the bottom
#[derive(Parser, Debug)]
#[command(name = "autoplank", disable_version_flag = true)]
struct Cli {
    /// Show version
    #[arg(short = 'v', long = "version")]
    version: bool,

    /// Mouse poll interval in seconds
    #[arg(long, value_name = "SECS")]
    interval: Option<u64>,

    /// Restart plank after moving it
    #[arg(long)]
    restart_dock: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if cli.version {
        println!("autoplank v{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    // Parse log level from environment variable
    let log_level = match std::env::var("LOG_LEVEL")
        .unwrap_or_else(|_| "info".to_string())
        .to_lowercase()
        .as_str()
    {
        "trace" => TraceLevel::TRACE,
        "debug" => TraceLevel::DEBUG,
        "warn" => TraceLevel::WARN,
        "error" => TraceLevel::ERROR,
        _ => TraceLevel::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut settings = Settings::load()?;
    if let Some(interval) = cli.interval {
        settings.poll_interval_secs = interval;
    }
    settings.restart_dock |= cli.restart_dock;
    settings.validate_and_clamp();
    info!(settings = ?settings, "Loaded settings");

    if !deps::validate(settings.restart_dock) {
        error!("Missing required tools, exiting");
        std::process::exit(1);
    }

    daemon::run_daemon(&settings)?;
    info!("Exiting");
    Ok(())
}

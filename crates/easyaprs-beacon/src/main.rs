//! EasyAPRS beacon: periodically injects position and object reports into
//! APRS-IS over a single shared login session.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use easyaprs_models::passcode_for;
use easyaprs_sdk::AprsIsClient;
use tracing::{error, info};

mod config;
mod lifecycle;
mod scheduler;
mod uplink;

use crate::config::{BeaconConfig, RawConfig};
use crate::lifecycle::{BeaconService, shutdown_signal};

/// Periodic APRS-IS position and object beacon.
#[derive(Parser, Debug)]
#[command(name = "easyaprs-beacon", about = "Periodic APRS-IS position and object beacon")]
struct Args {
    /// Configuration file (JSON). Falls back to `EASYAPRS_CONFIG`, then the
    /// default locations.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log packets instead of sending them, regardless of the configuration.
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and beacon until interrupted (default).
    Run,
    /// Print the APRS-IS passcode for a callsign.
    Passcode { callsign: String },
    /// Print every packet the configuration would send, without connecting.
    Preview,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise structured logging (controlled via RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    match args.command {
        Some(Command::Passcode { ref callsign }) => {
            println!("{}", passcode_for(callsign));
            Ok(())
        }
        Some(Command::Preview) => {
            let config = load_config(&args)?;
            for target in config.targets() {
                println!("{}", target.render(&config.identity.beacon));
            }
            Ok(())
        }
        Some(Command::Run) | None => run(load_config(&args)?).await,
    }
}

fn load_config(args: &Args) -> Result<BeaconConfig> {
    let path = args
        .config
        .clone()
        .or_else(|| std::env::var_os("EASYAPRS_CONFIG").map(PathBuf::from));

    let mut raw = RawConfig::load(path.as_deref()).inspect_err(|e| error!(error = %e, "error loading config"))?;
    raw.dry_run |= args.dry_run;

    let config = BeaconConfig::try_from(raw)
        .inspect_err(|e| error!(error = %e, "invalid configuration"))?;
    config.log_summary();
    Ok(config)
}

async fn run(config: BeaconConfig) -> Result<()> {
    info!("starting APRS beacon");

    let client = AprsIsClient::tcp(
        config.credentials(),
        config.servers.clone(),
        config.session_options(),
    )?;
    let service = BeaconService::new(Arc::new(client), &config);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    tokio::select! {
        started = service.start() => {
            started
                .inspect_err(|e| error!(error = %e, "initial APRS-IS login failed"))
                .context("could not start beacon")?;
            shutdown.await;
        }
        () = &mut shutdown => info!("shutdown requested during startup"),
    }

    service.stop().await;
    Ok(())
}

//! wNCG bridge relay entry point.
//!
//! Watches Ethereum for burns of wrapped NCG and pays out the same amount of NCG on Nine
//! Chronicles once each burn is buried under the configured number of confirmations.
//!
//! # Flow
//! 1. Loads `.env` and the JSON configuration (`config/bridge.json` unless `--config` is given)
//! 2. Resumes from the stored Ethereum checkpoint, or starts at the current tip
//! 3. Polls for confirmed blocks and hands every burn to the payout observer
//! 4. Stops gracefully on Ctrl+C

use bridge_relay::{
	bootstrap::{build_relay, load_config, Result},
	models::DEFAULT_CONFIG_PATH,
	services::state::FileMonitorStateStore,
	utils::{logging::setup_logging, parse_string_to_bytes_size},
};

use clap::Parser;
use dotenvy::dotenv_override;
use std::env::{set_var, var};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(
	name = "bridge-relay",
	about = "Relays wNCG burns on Ethereum to NCG transfers on Nine Chronicles.",
	version
)]
struct Cli {
	/// Path to the relay configuration file
	#[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_PATH)]
	config: PathBuf,

	/// Write logs to files instead of stdout
	#[arg(long)]
	log_file: bool,

	/// Set log level (trace, debug, info, warn, error)
	#[arg(long, value_name = "LEVEL")]
	log_level: Option<String>,

	/// Directory for log files
	#[arg(long, value_name = "PATH")]
	log_path: Option<String>,

	/// Maximum size of a log file before it is rolled, e.g. `100MB`
	#[arg(long, value_name = "SIZE", value_parser = parse_string_to_bytes_size)]
	log_max_size: Option<u64>,

	/// Validate the configuration and exit
	#[arg(long)]
	check: bool,
}

impl Cli {
	/// Exposes the logging flags through the environment `setup_logging` reads.
	fn apply_to_env(&self) {
		// Values in .env win over the inherited environment
		dotenv_override().ok();

		if self.log_file {
			set_var("LOG_MODE", "file");
		}

		if let Ok(level) = var("RUST_LOG") {
			set_var("LOG_LEVEL", level);
		}

		if let Some(level) = &self.log_level {
			set_var("LOG_LEVEL", level);
			set_var("RUST_LOG", level);
		}

		if let Some(path) = &self.log_path {
			set_var("LOG_DATA_DIR", path);
		}

		if let Some(max_size) = &self.log_max_size {
			set_var("LOG_MAX_SIZE", max_size.to_string());
		}
	}
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	cli.apply_to_env();

	setup_logging().unwrap_or_else(|e| {
		eprintln!("Failed to setup logging: {}", e);
	});

	if cli.check {
		return validate_configuration(&cli.config).await;
	}

	let config = load_config(&cli.config).await.map_err(|e| {
		error!(path = %cli.config.display(), "Failed to load configuration: {}", e);
		e
	})?;

	let monitor = build_relay(&config).await?;
	monitor.run().await?;

	info!("Relay started. Press Ctrl+C to shutdown");

	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Error waiting for Ctrl+C: {}", e);
	}
	info!("Shutdown signal received, stopping relay...");

	monitor.stop().await;

	info!("Shutdown complete");
	Ok(())
}

/// Loads the configuration and reports the outcome and the stored checkpoints without touching
/// any chain. Fails when the configuration is invalid.
async fn validate_configuration(path: &std::path::Path) -> Result<()> {
	info!(path = %path.display(), "Validating configuration...");

	match load_config(path).await {
		Ok(config) => {
			info!("✓ Configuration parsed and secrets resolved");
			info!(
				"✓ {} Ethereum RPC endpoint(s), {} confirmation(s)",
				config.ethereum.rpc_urls.len(),
				config.ethereum.confirmations
			);
			info!(
				endpoint = %config.nine_chronicles.graphql_endpoint,
				bridge = %config.nine_chronicles.bridge_address,
				"✓ Nine Chronicles headless configured"
			);
			report_checkpoints(&FileMonitorStateStore::new(config.storage_path.clone())).await;
			info!("Configuration validation completed successfully!");
			Ok(())
		}
		Err(e) => {
			error!("Configuration is invalid: {}", e);
			Err(e)
		}
	}
}

/// Logs where each chain would resume from.
async fn report_checkpoints(store: &FileMonitorStateStore) {
	match store.list().await {
		Ok(states) if states.is_empty() => {
			info!(path = %store.storage_path().display(), "No checkpoints, relay starts at the tip");
		}
		Ok(states) => {
			for state in states {
				info!(
					chain = %state.chain_name,
					block_hash = %state.location.block_hash,
					tx_id = ?state.location.tx_id,
					"✓ Checkpoint found"
				);
			}
		}
		Err(e) => error!("Checkpoints are unreadable: {}", e),
	}
}

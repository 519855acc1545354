//! Bootstrap module for wiring the relay together.
//!
//! Configuration is turned into concrete collaborators (`initialize_services`), the stored
//! Ethereum checkpoint is read, and a burn monitor is assembled around the Ethereum event source
//! with the burn observer subscribed (`create_burn_monitor`). `build_relay` does both.

use std::{error::Error, path::Path, sync::Arc};

use crate::{
	models::{BridgeConfig, BurnEvent, ConfigLoader, EthereumConfig, EventBatch},
	services::{
		blockchain::{
			EthereumBurnEventSource, EthereumClient, HeadlessGraphQLClient,
			TransientErrorRetryStrategy,
		},
		monitor::{ChainEventSource, ConfirmationMonitor, Monitor},
		notification::{Notifier, SlackNotifier},
		observer::{EthereumBurnEventObserver, Observer},
		state::{FileMonitorStateStore, MonitorStateStore, ETHEREUM_CHAIN},
		transfer::{NcgTransfer, TransferService},
	},
	utils::{
		http::{build_base_client, create_retryable_http_client},
		logging::reporter::{ErrorReporter, TracingErrorReporter},
	},
};

pub type Result<T> = std::result::Result<T, Box<dyn Error>>;

/// Publishes confirmed Ethereum blocks with their wNCG burns
pub type BurnMonitor = Monitor<EventBatch<BurnEvent>>;

/// Name of the Ethereum to Nine Chronicles monitor in logs and error metadata
pub const BURN_MONITOR_NAME: &str = "ethereum-burn";

/// Long-lived collaborators shared by the monitors and observers
pub struct RelayServices {
	pub state_store: Arc<FileMonitorStateStore>,
	pub transfer: Arc<dyn TransferService>,
	pub notifier: Arc<dyn Notifier>,
	pub reporter: Arc<dyn ErrorReporter>,
}

/// Loads and validates the configuration file.
pub async fn load_config(path: &Path) -> Result<BridgeConfig> {
	Ok(BridgeConfig::load_from_path(path).await?)
}

/// Creates the state store, the NCG transfer service and the Slack notifier.
pub async fn initialize_services(config: &BridgeConfig) -> Result<RelayServices> {
	let state_store = Arc::new(FileMonitorStateStore::new(config.storage_path.clone()));
	let removed = state_store.remove_stale_temp_files().await?;
	if removed > 0 {
		tracing::warn!(removed, "Removed unfinished state writes from a previous run");
	}

	let token = config
		.nine_chronicles
		.token
		.as_ref()
		.map(|token| token.resolve())
		.transpose()?;
	let headless = Arc::new(HeadlessGraphQLClient::new(
		&config.nine_chronicles.graphql_endpoint,
		token.as_ref(),
		&config.http_retry,
	)?);

	let transfer = Arc::new(NcgTransfer::new(
		headless,
		config.nine_chronicles.bridge_address.clone(),
	));

	let slack_client = Arc::new(create_retryable_http_client(
		&config.http_retry,
		build_base_client(&config.http_retry)?,
		Some(TransientErrorRetryStrategy),
	));
	let notifier = Arc::new(SlackNotifier::new(
		config.slack.webhook_url.resolve()?,
		slack_client,
	)?);

	Ok(RelayServices {
		state_store,
		transfer,
		notifier,
		reporter: Arc::new(TracingErrorReporter::new()),
	})
}

/// Builds the burn monitor over `chain`, resuming from the location stored for Ethereum, and
/// subscribes `observer`.
pub async fn create_burn_monitor<C>(
	chain: C,
	config: &EthereumConfig,
	store: Arc<dyn MonitorStateStore>,
	observer: Arc<dyn Observer<EventBatch<BurnEvent>>>,
	reporter: Arc<dyn ErrorReporter>,
) -> Result<BurnMonitor>
where
	C: ChainEventSource<Event = BurnEvent> + 'static,
{
	let resume_from = store.load(ETHEREUM_CHAIN).await?;
	match &resume_from {
		Some(location) => tracing::info!(
			block_hash = %location.block_hash,
			tx_id = ?location.tx_id,
			"Resuming Ethereum monitor"
		),
		None => tracing::info!("No Ethereum checkpoint, starting at the current tip"),
	}

	let source = ConfirmationMonitor::new(
		BURN_MONITOR_NAME,
		chain,
		resume_from,
		config.confirmations,
		reporter.clone(),
	)
	.with_poll_interval(config.poll_interval());

	let monitor = Monitor::new(BURN_MONITOR_NAME, source, reporter);
	monitor.subscribe(observer).await;
	Ok(monitor)
}

/// Wires the full Ethereum to Nine Chronicles relay from `config`. The monitor is not started.
pub async fn build_relay(config: &BridgeConfig) -> Result<BurnMonitor> {
	let services = initialize_services(config).await?;

	let rpc_urls = config
		.ethereum
		.rpc_urls
		.iter()
		.map(|url| url.resolve().map(|secret| secret.as_str().to_string()))
		.collect::<std::result::Result<Vec<_>, _>>()?;
	let ethereum = EthereumClient::new(&rpc_urls, &config.http_retry).await?;
	let chain = EthereumBurnEventSource::new(ethereum, &config.ethereum.wncg_contract_address)?;

	let observer = Arc::new(EthereumBurnEventObserver::new(
		services.transfer.clone(),
		services.notifier.clone(),
		services.state_store.clone(),
		services.reporter.clone(),
		config.explorer_url.clone(),
		config.etherscan_url.clone(),
	));

	create_burn_monitor(
		chain,
		&config.ethereum,
		services.state_store,
		observer,
		services.reporter,
	)
	.await
}

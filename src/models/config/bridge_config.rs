//! Relay configuration file.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::{
	collections::HashMap,
	path::{Path, PathBuf},
	time::Duration,
};

use crate::{
	models::{config::error::ConfigError, ConfigLoader, SecretValue},
	utils::{is_hex_address, RetryConfig},
};

/// Location of the configuration file when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "config/bridge.json";

fn default_poll_interval_ms() -> u64 {
	15_000
}

fn default_storage_path() -> PathBuf {
	PathBuf::from("data")
}

/// Ethereum side: where burns of wNCG are observed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EthereumConfig {
	/// JSON-RPC endpoints, tried in order
	pub rpc_urls: Vec<SecretValue>,
	/// Address of the wNCG ERC-20 contract
	pub wncg_contract_address: String,
	/// Blocks a burn must be buried under before it is relayed
	#[serde(default)]
	pub confirmations: u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

/// Nine Chronicles side: where NCG is transferred from the bridge account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NineChroniclesConfig {
	pub graphql_endpoint: String,
	/// The bridge's own Nine Chronicles address
	pub bridge_address: String,
	/// Bearer token for the headless node
	#[serde(default)]
	pub token: Option<SecretValue>,
	#[serde(default)]
	pub confirmations: u64,
	#[serde(default = "default_poll_interval_ms")]
	pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlackConfig {
	/// Incoming-webhook URL
	pub webhook_url: SecretValue,
}

/// Top-level relay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeConfig {
	pub ethereum: EthereumConfig,
	pub nine_chronicles: NineChroniclesConfig,
	pub slack: SlackConfig,
	/// Nine Chronicles explorer base URL used in notification links
	pub explorer_url: String,
	/// Etherscan base URL used in notification links
	pub etherscan_url: String,
	/// Directory holding the per-chain checkpoint files
	#[serde(default = "default_storage_path")]
	pub storage_path: PathBuf,
	#[serde(default)]
	pub http_retry: RetryConfig,
}

impl EthereumConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

impl NineChroniclesConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_millis(self.poll_interval_ms)
	}
}

fn path_metadata(path: &Path) -> Option<HashMap<String, String>> {
	Some(HashMap::from([(
		"path".to_string(),
		path.display().to_string(),
	)]))
}

fn field_metadata(field: &str) -> Option<HashMap<String, String>> {
	Some(HashMap::from([("field".to_string(), field.to_string())]))
}

fn check_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
	let parsed = url::Url::parse(value).map_err(|e| {
		ConfigError::validation_error(
			format!("{} is not a valid URL", field),
			Some(Box::new(e)),
			field_metadata(field),
		)
	})?;

	match parsed.scheme() {
		"http" | "https" => Ok(()),
		scheme => Err(ConfigError::validation_error(
			format!("{} must use http or https, got {}", field, scheme),
			None,
			field_metadata(field),
		)),
	}
}

/// Plain secrets are checked as URLs; environment references are checked once resolved.
fn check_secret_url(field: &str, value: &SecretValue) -> Result<(), ConfigError> {
	if value.is_empty() {
		return Err(ConfigError::validation_error(
			format!("{} must not be empty", field),
			None,
			field_metadata(field),
		));
	}
	match value {
		SecretValue::Plain(secret) => check_http_url(field, secret.as_str()),
		SecretValue::Environment(_) => Ok(()),
	}
}

fn resolve(field: &str, value: &SecretValue) -> Result<SecretValue, ConfigError> {
	value.resolve().map(SecretValue::Plain).map_err(|e| {
		ConfigError::parse_error(
			format!("failed to resolve {}", field),
			Some(e as Box<dyn std::error::Error + Send + Sync>),
			field_metadata(field),
		)
	})
}

#[async_trait]
impl ConfigLoader for BridgeConfig {
	/// Parses the file, resolves its secrets and validates the result.
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let content = tokio::fs::read_to_string(path).await.map_err(|e| {
			ConfigError::file_error(
				format!("failed to read config file: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;

		let config: BridgeConfig = serde_json::from_str(&content).map_err(|e| {
			ConfigError::parse_error(
				format!("failed to parse config: {}", e),
				Some(Box::new(e)),
				path_metadata(path),
			)
		})?;

		let config = config.resolve_secrets().await?;
		config.validate()?;
		Ok(config)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.ethereum.rpc_urls.is_empty() {
			return Err(ConfigError::validation_error(
				"At least one Ethereum RPC URL is required",
				None,
				field_metadata("ethereum.rpc_urls"),
			));
		}
		for rpc_url in &self.ethereum.rpc_urls {
			check_secret_url("ethereum.rpc_urls", rpc_url)?;
		}

		if !is_hex_address(&self.ethereum.wncg_contract_address) {
			return Err(ConfigError::validation_error(
				"wNCG contract address must be a 0x-prefixed 20-byte hex string",
				None,
				field_metadata("ethereum.wncg_contract_address"),
			));
		}
		if !is_hex_address(&self.nine_chronicles.bridge_address) {
			return Err(ConfigError::validation_error(
				"Bridge address must be a 0x-prefixed 20-byte hex string",
				None,
				field_metadata("nine_chronicles.bridge_address"),
			));
		}

		if self.ethereum.poll_interval_ms == 0 || self.nine_chronicles.poll_interval_ms == 0 {
			return Err(ConfigError::validation_error(
				"Poll interval must be greater than 0",
				None,
				None,
			));
		}

		check_http_url(
			"nine_chronicles.graphql_endpoint",
			&self.nine_chronicles.graphql_endpoint,
		)?;
		check_secret_url("slack.webhook_url", &self.slack.webhook_url)?;
		check_http_url("explorer_url", &self.explorer_url)?;
		check_http_url("etherscan_url", &self.etherscan_url)?;

		if self.ethereum.confirmations == 0 {
			tracing::warn!("Ethereum confirmations is 0, burns are relayed from the chain tip");
		}

		Ok(())
	}

	async fn resolve_secrets(&self) -> Result<Self, ConfigError> {
		dotenvy::dotenv().ok();
		let mut config = self.clone();

		config.ethereum.rpc_urls = self
			.ethereum
			.rpc_urls
			.iter()
			.map(|url| resolve("ethereum.rpc_urls", url))
			.collect::<Result<_, _>>()?;
		config.slack.webhook_url = resolve("slack.webhook_url", &self.slack.webhook_url)?;
		if let Some(token) = &self.nine_chronicles.token {
			config.nine_chronicles.token = Some(resolve("nine_chronicles.token", token)?);
		}

		Ok(config)
	}
}

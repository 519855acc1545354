//! Configuration loading and validation.

#![allow(clippy::result_large_err)]

use async_trait::async_trait;
use std::path::Path;

mod bridge_config;
mod error;

pub use bridge_config::{
	BridgeConfig, EthereumConfig, NineChroniclesConfig, SlackConfig, DEFAULT_CONFIG_PATH,
};
pub use error::ConfigError;

/// Common interface for configuration files
#[async_trait]
pub trait ConfigLoader: Sized {
	/// Reads and parses the configuration at `path`.
	async fn load_from_path(path: &Path) -> Result<Self, ConfigError>;

	/// Checks the semantic constraints that parsing cannot express.
	fn validate(&self) -> Result<(), ConfigError>;

	/// Returns a copy with every secret replaced by its resolved plain value.
	async fn resolve_secrets(&self) -> Result<Self, ConfigError>;

	fn is_json_file(path: &Path) -> bool {
		path.extension()
			.map(|ext| ext.to_string_lossy().eq_ignore_ascii_case("json"))
			.unwrap_or(false)
	}
}

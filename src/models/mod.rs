//! Domain models.
//!
//! - `blockchain`: chain-specific payloads (Ethereum burn logs, Nine Chronicles transfers)
//! - `config`: relay configuration loading and validation
//! - `core`: chain-agnostic progress locations, batches and notifications
//! - `security`: secrets

mod blockchain;
mod config;
mod core;
mod security;

pub use blockchain::{
	burn_event_topic, BlockHeader, BurnEvent, NcgTransferHistory, NcgTransferredEvent, RpcLog,
	BURN_EVENT_SIGNATURE,
};

pub use core::{EventBatch, Located, MonitorState, NotificationMessage, TransactionLocation};

pub use config::{
	BridgeConfig, ConfigError, ConfigLoader, EthereumConfig, NineChroniclesConfig, SlackConfig,
	DEFAULT_CONFIG_PATH,
};

pub use security::{SecretString, SecretValue, SecurityError, SecurityResult};

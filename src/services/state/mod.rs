//! Durable relay checkpoints.
//!
//! A [`MonitorStateStore`] maps a chain name to the last [`TransactionLocation`] whose side
//! effects completed. The monitor reads it once at startup; observers write it.

use async_trait::async_trait;

use crate::models::TransactionLocation;

mod error;
mod file;

pub use error::StateStoreError;
pub use file::FileMonitorStateStore;

/// Key under which Ethereum burn progress is stored
pub const ETHEREUM_CHAIN: &str = "ethereum";

#[async_trait]
pub trait MonitorStateStore: Send + Sync {
	/// Last stored location for `chain_name`, `None` if nothing was stored yet.
	async fn load(&self, chain_name: &str) -> Result<Option<TransactionLocation>, StateStoreError>;

	/// Replaces the location for `chain_name`. Durable once this returns `Ok`.
	async fn store(
		&self,
		chain_name: &str,
		location: &TransactionLocation,
	) -> Result<(), StateStoreError>;
}

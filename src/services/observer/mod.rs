//! Consumers of published batches.

use async_trait::async_trait;

mod burn_event;
mod error;

pub use burn_event::EthereumBurnEventObserver;
pub use error::ObserverError;

/// Receives every item a monitor publishes.
///
/// `notify` finishes all side effects before returning. An error is logged and reported by the
/// engine and does not stop delivery.
#[async_trait]
pub trait Observer<T>: Send + Sync {
	async fn notify(&self, item: &T) -> Result<(), ObserverError>;
}

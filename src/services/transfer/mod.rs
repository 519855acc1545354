//! Payouts on the destination chain.

use async_trait::async_trait;
use rust_decimal::Decimal;

mod error;
mod ncg;

pub use error::TransferError;
pub use ncg::NcgTransfer;

/// Sends `amount` to `recipient` and returns the destination transaction id.
///
/// With `nonce == None` the implementation picks the next nonce itself.
#[async_trait]
pub trait TransferService: Send + Sync {
	async fn transfer(
		&self,
		recipient: &str,
		amount: &Decimal,
		nonce: Option<u64>,
	) -> Result<String, TransferError>;
}

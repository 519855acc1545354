//! NCG payouts through the headless node, which signs with the bridge key.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::Mutex;
use tracing::instrument;

use crate::services::{
	blockchain::HeadlessClientTrait,
	transfer::{TransferError, TransferService},
};

pub struct NcgTransfer<H> {
	client: Arc<H>,
	bridge_address: String,
	/// Held from nonce lookup until the transfer is staged
	submission: Mutex<()>,
}

impl<H: HeadlessClientTrait> NcgTransfer<H> {
	pub fn new(client: Arc<H>, bridge_address: impl Into<String>) -> Self {
		Self {
			client,
			bridge_address: bridge_address.into(),
			submission: Mutex::new(()),
		}
	}

	fn metadata(&self, recipient: &str, amount: &Decimal) -> Option<HashMap<String, String>> {
		Some(HashMap::from([
			("recipient".to_string(), recipient.to_string()),
			("amount".to_string(), amount.to_string()),
			("bridge".to_string(), self.bridge_address.clone()),
		]))
	}
}

#[async_trait]
impl<H: HeadlessClientTrait> TransferService for NcgTransfer<H> {
	#[instrument(skip(self), fields(bridge = %self.bridge_address))]
	async fn transfer(
		&self,
		recipient: &str,
		amount: &Decimal,
		nonce: Option<u64>,
	) -> Result<String, TransferError> {
		if amount.is_sign_negative() || amount.is_zero() {
			return Err(TransferError::validation_error(
				"Amount must be positive",
				None,
				self.metadata(recipient, amount),
			));
		}

		let _guard = self.submission.lock().await;

		let nonce = match nonce {
			Some(nonce) => nonce,
			None => self
				.client
				.get_next_tx_nonce(&self.bridge_address)
				.await
				.map_err(|e| {
					TransferError::network_error(
						"Failed to get next transaction nonce",
						Some(e.into()),
						self.metadata(recipient, amount),
					)
				})?,
		};

		let tx_id = self
			.client
			.transfer(recipient, &amount.to_string(), nonce, None)
			.await
			.map_err(|e| {
				TransferError::network_error(
					"Failed to stage NCG transfer",
					Some(e.into()),
					self.metadata(recipient, amount),
				)
			})?;

		tracing::info!(%tx_id, nonce, "Staged NCG transfer");
		Ok(tx_id)
	}
}

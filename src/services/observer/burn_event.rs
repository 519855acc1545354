//! Pays out wNCG burns as NCG on Nine Chronicles.
//!
//! For every event of a confirmed batch, in order: normalise the amount to NCG precision, stage the
//! transfer, checkpoint the event and announce the result on Slack. A failed transfer is announced
//! and skipped so the remaining events of the batch still go through, but no later event of that
//! batch is checkpointed: a restart re-emits the unpaid burn and everything after it.

use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tracing::instrument;

use crate::{
	models::{BurnEvent, EventBatch, Located, NotificationMessage, TransactionLocation},
	services::{
		notification::{Notifier, UnwrappedEvent, UnwrappingFailureEvent},
		observer::{Observer, ObserverError},
		state::{MonitorStateStore, StateStoreError, ETHEREUM_CHAIN},
		transfer::TransferService,
	},
	utils::{
		amount::{normalize_amount, NCG_PRECISION, WNCG_DECIMALS},
		logging::reporter::ErrorReporter,
	},
};

/// Outcome of a single burn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Payout {
	Paid,
	Failed,
}

pub struct EthereumBurnEventObserver {
	transfer: Arc<dyn TransferService>,
	notifier: Arc<dyn Notifier>,
	store: Arc<dyn MonitorStateStore>,
	reporter: Arc<dyn ErrorReporter>,
	explorer_url: String,
	etherscan_url: String,
}

impl EthereumBurnEventObserver {
	pub fn new(
		transfer: Arc<dyn TransferService>,
		notifier: Arc<dyn Notifier>,
		store: Arc<dyn MonitorStateStore>,
		reporter: Arc<dyn ErrorReporter>,
		explorer_url: impl Into<String>,
		etherscan_url: impl Into<String>,
	) -> Self {
		Self {
			transfer,
			notifier,
			store,
			reporter,
			explorer_url: explorer_url.into(),
			etherscan_url: etherscan_url.into(),
		}
	}

	/// Persists `location`. The side effects it covers already happened, so a failure is only
	/// logged and reported.
	async fn checkpoint(&self, location: &TransactionLocation) {
		if let Err(e) = self.store.store(ETHEREUM_CHAIN, location).await {
			let error = StateStoreError::storage_error(
				"Failed to checkpoint handled burn",
				Some(Box::new(e)),
				Some(HashMap::from([
					("block_hash".to_string(), location.block_hash.clone()),
					(
						"tx_id".to_string(),
						location.tx_id.clone().unwrap_or_default(),
					),
				])),
			);
			self.reporter.capture(&error);
		}
	}

	async fn post(&self, message: NotificationMessage) {
		if let Err(e) = self.notifier.post(&message).await {
			tracing::error!(title = %message.title, error = %e, "Failed to post notification");
		}
	}

	/// Handles one burn. Only a malformed event is returned as an error.
	///
	/// With `checkpoint == false` a successful payout is not recorded, so the stored location
	/// keeps pointing before an earlier unpaid event of the same block.
	#[instrument(skip_all, fields(tx_id = %located.tx_id))]
	async fn handle_burn(
		&self,
		located: &Located<BurnEvent>,
		checkpoint: bool,
	) -> Result<Payout, ObserverError> {
		let event = &located.event;
		let recipient = event.recipient();
		let amount = normalize_amount(event.amount, WNCG_DECIMALS, NCG_PRECISION).map_err(|e| {
			ObserverError::processing_error(
				"Burn amount cannot be represented in NCG",
				Some(Box::new(e)),
				Some(HashMap::from([
					("tx_id".to_string(), located.tx_id.clone()),
					("amount".to_string(), event.amount.to_string()),
				])),
			)
		})?;

		match self.transfer.transfer(recipient, &amount, None).await {
			Ok(nine_chronicles_tx_id) => {
				tracing::info!(
					sender = %event.sender,
					recipient,
					%amount,
					%nine_chronicles_tx_id,
					"Unwrapped wNCG"
				);
				if checkpoint {
					self.checkpoint(&located.location()).await;
				} else {
					tracing::warn!("Checkpoint held back by an earlier unpaid burn in this block");
				}
				self.post(
					UnwrappedEvent {
						explorer_url: &self.explorer_url,
						etherscan_url: &self.etherscan_url,
						sender: &event.sender,
						recipient,
						amount: &amount,
						nine_chronicles_tx_id: &nine_chronicles_tx_id,
						ethereum_tx_id: &located.tx_id,
					}
					.render(),
				)
				.await;
				Ok(Payout::Paid)
			}
			Err(e) => {
				tracing::warn!(recipient, %amount, error = %e, "Unwrapping failed");
				self.post(
					UnwrappingFailureEvent {
						etherscan_url: &self.etherscan_url,
						sender: &event.sender,
						recipient,
						amount: &amount,
						ethereum_tx_id: &located.tx_id,
						error: &e.to_string(),
					}
					.render(),
				)
				.await;
				Ok(Payout::Failed)
			}
		}
	}
}

#[async_trait]
impl Observer<EventBatch<BurnEvent>> for EthereumBurnEventObserver {
	#[instrument(skip_all, fields(block_hash = %batch.block_hash, events = batch.events.len()))]
	async fn notify(&self, batch: &EventBatch<BurnEvent>) -> Result<(), ObserverError> {
		if batch.is_empty() {
			self.checkpoint(&TransactionLocation::block(batch.block_hash.clone()))
				.await;
			return Ok(());
		}

		// Once a burn goes unpaid, later checkpoints would make a restart skip it
		let mut checkpoint_frozen = false;
		let mut first_error = None;
		for located in &batch.events {
			match self.handle_burn(located, !checkpoint_frozen).await {
				Ok(Payout::Paid) => {}
				Ok(Payout::Failed) => checkpoint_frozen = true,
				Err(e) => {
					checkpoint_frozen = true;
					first_error.get_or_insert(e);
				}
			}
		}

		match first_error {
			Some(e) => Err(e),
			None => Ok(()),
		}
	}
}

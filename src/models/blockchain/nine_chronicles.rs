//! Nine Chronicles headless payloads.

use serde::{Deserialize, Serialize};

use crate::models::Located;

/// An NCG transfer observed on Nine Chronicles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NcgTransferredEvent {
	pub sender: String,
	pub recipient: String,
	/// Decimal amount as rendered by the headless node, e.g. `"10.50"`
	pub amount: String,
	pub memo: Option<String>,
}

/// Raw transfer entry of the `transferNCGHistories` query
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NcgTransferHistory {
	pub block_hash: String,
	pub tx_id: String,
	pub sender: String,
	pub recipient: String,
	pub amount: String,
	pub memo: Option<String>,
}

impl From<NcgTransferHistory> for Located<NcgTransferredEvent> {
	fn from(history: NcgTransferHistory) -> Self {
		Located::new(
			history.block_hash,
			history.tx_id,
			NcgTransferredEvent {
				sender: history.sender,
				recipient: history.recipient,
				amount: history.amount,
				memo: history.memo,
			},
		)
	}
}

use serde::{Deserialize, Serialize};

/// A point of progress on a source chain.
///
/// `tx_id == None` means every event of `block_hash` has been handled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionLocation {
	pub block_hash: String,
	pub tx_id: Option<String>,
}

impl TransactionLocation {
	pub fn new(block_hash: impl Into<String>, tx_id: Option<String>) -> Self {
		Self {
			block_hash: block_hash.into(),
			tx_id,
		}
	}

	/// Location covering a whole block
	pub fn block(block_hash: impl Into<String>) -> Self {
		Self::new(block_hash, None)
	}
}

/// An event payload together with the block and transaction it was emitted in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Located<E> {
	pub block_hash: String,
	pub tx_id: String,
	#[serde(flatten)]
	pub event: E,
}

impl<E> Located<E> {
	pub fn new(block_hash: impl Into<String>, tx_id: impl Into<String>, event: E) -> Self {
		Self {
			block_hash: block_hash.into(),
			tx_id: tx_id.into(),
			event,
		}
	}

	/// The checkpoint written once this event has been acted on
	pub fn location(&self) -> TransactionLocation {
		TransactionLocation::new(self.block_hash.clone(), Some(self.tx_id.clone()))
	}
}

/// All matching events of one confirmed block, in on-chain order. May be empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventBatch<E> {
	pub block_hash: String,
	pub events: Vec<Located<E>>,
}

impl<E> EventBatch<E> {
	pub fn new(block_hash: impl Into<String>, events: Vec<Located<E>>) -> Self {
		Self {
			block_hash: block_hash.into(),
			events,
		}
	}

	pub fn is_empty(&self) -> bool {
		self.events.is_empty()
	}
}

/// The persisted checkpoint of one relay direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorState {
	pub chain_name: String,
	pub location: TransactionLocation,
}

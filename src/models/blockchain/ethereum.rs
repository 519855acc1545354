//! Ethereum JSON-RPC payloads and the decoded wNCG `Burn` event.

use alloy::primitives::{keccak256, Address, Bytes, B256, U256, U64};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::models::Located;

/// Solidity signature of the wNCG burn event
pub const BURN_EVENT_SIGNATURE: &str = "Burn(address,bytes32,uint256)";

/// `topic0` of every wNCG burn log
pub fn burn_event_topic() -> B256 {
	keccak256(BURN_EVENT_SIGNATURE.as_bytes())
}

/// The subset of an `eth_getBlockBy*` response the relay reads
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BlockHeader {
	/// `None` for pending blocks
	pub hash: Option<B256>,
	pub number: Option<U64>,
}

/// A log entry as returned by `eth_getLogs`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcLog {
	pub address: Address,
	pub topics: Vec<B256>,
	pub data: Bytes,
	pub block_hash: Option<B256>,
	pub block_number: Option<U64>,
	pub transaction_hash: Option<B256>,
	pub log_index: Option<U64>,
	#[serde(default)]
	pub removed: bool,
}

/// A burn of wNCG that asks for NCG on Nine Chronicles
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnEvent {
	/// Checksummed Ethereum address that burned the tokens
	pub sender: String,
	/// Raw `bytes32` destination as `0x`-prefixed hex
	pub to: String,
	/// Burned amount in wNCG base units (18 decimals)
	pub amount: U256,
}

impl BurnEvent {
	/// The Nine Chronicles address encoded in the first 20 bytes of `to`
	pub fn recipient(&self) -> &str {
		self.to.get(..42).unwrap_or(&self.to)
	}

	/// Decodes a `Burn(address indexed, bytes32 indexed, uint256)` log.
	pub fn from_log(log: &RpcLog) -> anyhow::Result<Located<BurnEvent>> {
		if log.topics.first() != Some(&burn_event_topic()) {
			return Err(anyhow!("log is not a Burn event"));
		}
		let [_, sender_topic, to_topic] = log.topics.as_slice() else {
			return Err(anyhow!(
				"Burn log has {} topics, expected 3",
				log.topics.len()
			));
		};
		if log.data.len() != 32 {
			return Err(anyhow!(
				"Burn log data is {} bytes, expected 32",
				log.data.len()
			));
		}

		let block_hash = log.block_hash.context("Burn log without block hash")?;
		let tx_hash = log
			.transaction_hash
			.context("Burn log without transaction hash")?;

		let event = BurnEvent {
			sender: Address::from_word(*sender_topic).to_checksum(None),
			to: format!("{:#x}", to_topic),
			amount: U256::from_be_slice(&log.data),
		};

		Ok(Located::new(
			format!("{:#x}", block_hash),
			format!("{:#x}", tx_hash),
			event,
		))
	}
}

//! Ethereum JSON-RPC client and the wNCG burn event source built on it.

use alloy::primitives::{Address, B256};
use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::instrument;

use crate::{
	models::{burn_event_topic, BlockHeader, BurnEvent, Located, RpcLog},
	services::{
		blockchain::transports::{BlockchainTransport, HttpTransportClient},
		monitor::ChainEventSource,
	},
	utils::http::RetryConfig,
};

#[derive(Clone, Debug)]
pub struct EthereumClient<T> {
	http_client: T,
}

impl<T> EthereumClient<T> {
	pub fn new_with_transport(http_client: T) -> Self {
		Self { http_client }
	}
}

impl EthereumClient<HttpTransportClient> {
	pub async fn new(rpc_urls: &[String], retry: &RetryConfig) -> Result<Self, anyhow::Error> {
		Ok(Self::new_with_transport(
			HttpTransportClient::new(rpc_urls, retry).await?,
		))
	}
}

impl<T: BlockchainTransport> EthereumClient<T> {
	/// Sends a JSON-RPC call and returns its `result`, which may be `null`.
	async fn call(&self, method: &str, params: Value) -> Result<Value, anyhow::Error> {
		let mut response = self
			.http_client
			.send_raw_request(method, Some(params))
			.await
			.with_context(|| format!("{} request failed", method))?;

		if let Some(error) = response.get("error") {
			anyhow::bail!("{} returned an error: {}", method, error);
		}
		response
			.get_mut("result")
			.map(Value::take)
			.with_context(|| format!("Missing 'result' field in {} response", method))
	}

	async fn call_non_null<R: DeserializeOwned>(
		&self,
		method: &str,
		params: Value,
		missing: impl FnOnce() -> String,
	) -> Result<R, anyhow::Error> {
		let result = self.call(method, params).await?;
		if result.is_null() {
			anyhow::bail!(missing());
		}
		serde_json::from_value(result).with_context(|| format!("Failed to parse {} result", method))
	}

	#[instrument(skip(self))]
	pub async fn get_latest_block_number(&self) -> Result<u64, anyhow::Error> {
		let hex_str: String = self
			.call_non_null("eth_blockNumber", json!([]), || {
				"Node returned no block number".to_string()
			})
			.await?;

		u64::from_str_radix(hex_str.trim_start_matches("0x"), 16)
			.with_context(|| format!("Failed to parse block number '{}'", hex_str))
	}

	#[instrument(skip(self))]
	pub async fn get_block_by_hash(&self, block_hash: &str) -> Result<BlockHeader, anyhow::Error> {
		self.call_non_null("eth_getBlockByHash", json!([block_hash, false]), || {
			format!("Unknown block {}", block_hash)
		})
		.await
	}

	#[instrument(skip(self))]
	pub async fn get_block_by_number(&self, number: u64) -> Result<BlockHeader, anyhow::Error> {
		self.call_non_null(
			"eth_getBlockByNumber",
			json!([format!("0x{:x}", number), false]),
			|| format!("Block {} is beyond the tip", number),
		)
		.await
	}

	/// Logs of `address` with `topic0` in blocks `from_block..=to_block`
	#[instrument(skip(self))]
	pub async fn get_logs(
		&self,
		from_block: u64,
		to_block: u64,
		address: Address,
		topic0: B256,
	) -> Result<Vec<RpcLog>, anyhow::Error> {
		let filter = json!([{
			"fromBlock": format!("0x{:x}", from_block),
			"toBlock": format!("0x{:x}", to_block),
			"address": address,
			"topics": [topic0],
		}]);

		self.call_non_null("eth_getLogs", filter, || {
			format!("No logs result for blocks {}-{}", from_block, to_block)
		})
		.await
	}
}

/// Burn events of the wNCG contract, one block at a time
pub struct EthereumBurnEventSource<T> {
	client: EthereumClient<T>,
	contract: Address,
}

impl<T> EthereumBurnEventSource<T> {
	pub fn new(client: EthereumClient<T>, contract_address: &str) -> Result<Self, anyhow::Error> {
		let contract = Address::from_str(contract_address)
			.with_context(|| format!("Invalid wNCG contract address '{}'", contract_address))?;
		Ok(Self { client, contract })
	}
}

#[async_trait]
impl<T: BlockchainTransport> ChainEventSource for EthereumBurnEventSource<T> {
	type Event = BurnEvent;

	async fn block_index(&self, block_hash: &str) -> anyhow::Result<u64> {
		let header = self.client.get_block_by_hash(block_hash).await?;
		header
			.number
			.map(|number| number.to::<u64>())
			.with_context(|| format!("Block {} has no number", block_hash))
	}

	async fn block_hash(&self, index: u64) -> anyhow::Result<String> {
		let header = self.client.get_block_by_number(index).await?;
		header
			.hash
			.map(|hash| format!("{:#x}", hash))
			.with_context(|| format!("Block {} has no hash", index))
	}

	async fn tip_index(&self) -> anyhow::Result<u64> {
		self.client.get_latest_block_number().await
	}

	async fn events(&self, index: u64) -> anyhow::Result<Vec<Located<BurnEvent>>> {
		let mut logs = self
			.client
			.get_logs(index, index, self.contract, burn_event_topic())
			.await?;

		logs.retain(|log| !log.removed);
		logs.sort_by_key(|log| log.log_index);

		logs.iter()
			.map(|log| {
				BurnEvent::from_log(log)
					.with_context(|| format!("Malformed Burn log in block {}", index))
			})
			.collect()
	}
}

//! Nine Chronicles headless GraphQL client and the NCG transfer event source built on it.

use anyhow::Context;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::instrument;

use crate::{
	models::{Located, NcgTransferHistory, NcgTransferredEvent, SecretString},
	services::{
		blockchain::transports::{BlockchainTransport, GraphQLTransportClient},
		monitor::ChainEventSource,
	},
	utils::http::RetryConfig,
};

const BLOCK_INDEX_QUERY: &str = "query GetBlockIndex($hash: ID!) { \
	chainQuery { blockQuery { block(hash: $hash) { index } } } }";

const TIP_INDEX_QUERY: &str = "query GetTipIndex { nodeStatus { tip { index } } }";

const BLOCK_HASH_QUERY: &str = "query GetBlockHash($index: ID!) { \
	chainQuery { blockQuery { block(index: $index) { hash } } } }";

const TRANSFERRED_EVENTS_QUERY: &str = "query GetNCGTransferredEvents(\
	$blockHash: ByteString!, $recipient: Address!) { \
	transferNCGHistories(blockHash: $blockHash, recipient: $recipient) { \
	blockHash txId sender recipient amount memo } }";

const NEXT_TX_NONCE_QUERY: &str = "query GetNextTxNonce($address: Address!) { \
	transaction { nextTxNonce(address: $address) } }";

const TRANSFER_MUTATION: &str = "mutation Transfer(\
	$recipient: Address!, $amount: String!, $txNonce: Long!, $memo: String) { \
	transfer(recipient: $recipient, amount: $amount, txNonce: $txNonce, currency: NCG, memo: $memo) }";

/// Operations of the headless node the relay needs
#[async_trait]
pub trait HeadlessClientTrait: Send + Sync {
	async fn get_block_index(&self, block_hash: &str) -> Result<u64, anyhow::Error>;

	async fn get_tip_index(&self) -> Result<u64, anyhow::Error>;

	async fn get_block_hash(&self, index: u64) -> Result<String, anyhow::Error>;

	/// NCG transfers to `recipient` in the block with `block_hash`, in transaction order
	async fn get_ncg_transferred_events(
		&self,
		block_hash: &str,
		recipient: &str,
	) -> Result<Vec<Located<NcgTransferredEvent>>, anyhow::Error>;

	async fn get_next_tx_nonce(&self, address: &str) -> Result<u64, anyhow::Error>;

	/// Stages an NCG transfer signed by the node and returns its transaction id
	async fn transfer(
		&self,
		recipient: &str,
		amount: &str,
		tx_nonce: u64,
		memo: Option<String>,
	) -> Result<String, anyhow::Error>;
}

#[derive(Clone, Debug)]
pub struct HeadlessGraphQLClient<T> {
	transport: T,
}

impl<T> HeadlessGraphQLClient<T> {
	pub fn new_with_transport(transport: T) -> Self {
		Self { transport }
	}
}

impl HeadlessGraphQLClient<GraphQLTransportClient> {
	pub fn new(
		endpoint: &str,
		token: Option<&SecretString>,
		retry: &RetryConfig,
	) -> Result<Self, anyhow::Error> {
		Ok(Self::new_with_transport(GraphQLTransportClient::new(
			endpoint, token, retry,
		)?))
	}
}

/// Walks `path` below `data`, failing on missing or null values
fn pointer<R: DeserializeOwned>(response: &Value, path: &[&str]) -> Result<R, anyhow::Error> {
	let mut value = response.get("data").context("Response has no 'data'")?;
	for key in path {
		value = value
			.get(key)
			.filter(|inner| !inner.is_null())
			.with_context(|| format!("Response is missing '{}'", key))?;
	}
	serde_json::from_value(value.clone())
		.with_context(|| format!("Failed to parse '{}'", path.join(".")))
}

/// GraphQL `Long` and `ID` values may arrive as numbers or strings
fn as_u64(value: Value) -> Result<u64, anyhow::Error> {
	match &value {
		Value::Number(number) => number.as_u64(),
		Value::String(text) => text.parse().ok(),
		_ => None,
	}
	.with_context(|| format!("Expected an unsigned integer, got {}", value))
}

impl<T: BlockchainTransport> HeadlessGraphQLClient<T> {
	async fn query(&self, document: &str, variables: Value) -> Result<Value, anyhow::Error> {
		self.transport
			.send_raw_request(document, Some(variables))
			.await
			.map_err(anyhow::Error::from)
	}
}

#[async_trait]
impl<T: BlockchainTransport> HeadlessClientTrait for HeadlessGraphQLClient<T> {
	#[instrument(skip(self))]
	async fn get_block_index(&self, block_hash: &str) -> Result<u64, anyhow::Error> {
		let response = self
			.query(BLOCK_INDEX_QUERY, json!({ "hash": block_hash }))
			.await
			.with_context(|| format!("Failed to get index of block {}", block_hash))?;
		as_u64(pointer(
			&response,
			&["chainQuery", "blockQuery", "block", "index"],
		)?)
	}

	#[instrument(skip(self))]
	async fn get_tip_index(&self) -> Result<u64, anyhow::Error> {
		let response = self
			.query(TIP_INDEX_QUERY, json!({}))
			.await
			.context("Failed to get tip index")?;
		as_u64(pointer(&response, &["nodeStatus", "tip", "index"])?)
	}

	#[instrument(skip(self))]
	async fn get_block_hash(&self, index: u64) -> Result<String, anyhow::Error> {
		let response = self
			.query(BLOCK_HASH_QUERY, json!({ "index": index.to_string() }))
			.await
			.with_context(|| format!("Failed to get hash of block {}", index))?;
		pointer(&response, &["chainQuery", "blockQuery", "block", "hash"])
	}

	#[instrument(skip(self))]
	async fn get_ncg_transferred_events(
		&self,
		block_hash: &str,
		recipient: &str,
	) -> Result<Vec<Located<NcgTransferredEvent>>, anyhow::Error> {
		let response = self
			.query(
				TRANSFERRED_EVENTS_QUERY,
				json!({ "blockHash": block_hash, "recipient": recipient }),
			)
			.await
			.with_context(|| format!("Failed to get NCG transfers of block {}", block_hash))?;
		let histories: Vec<NcgTransferHistory> = pointer(&response, &["transferNCGHistories"])?;
		Ok(histories.into_iter().map(Located::from).collect())
	}

	#[instrument(skip(self))]
	async fn get_next_tx_nonce(&self, address: &str) -> Result<u64, anyhow::Error> {
		let response = self
			.query(NEXT_TX_NONCE_QUERY, json!({ "address": address }))
			.await
			.with_context(|| format!("Failed to get next nonce of {}", address))?;
		as_u64(pointer(&response, &["transaction", "nextTxNonce"])?)
	}

	#[instrument(skip(self))]
	async fn transfer(
		&self,
		recipient: &str,
		amount: &str,
		tx_nonce: u64,
		memo: Option<String>,
	) -> Result<String, anyhow::Error> {
		let response = self
			.query(
				TRANSFER_MUTATION,
				json!({
					"recipient": recipient,
					"amount": amount,
					"txNonce": tx_nonce,
					"memo": memo,
				}),
			)
			.await
			.with_context(|| format!("Failed to transfer {} NCG to {}", amount, recipient))?;
		pointer(&response, &["transfer"])
	}
}

/// NCG transfers to the bridge address, one block at a time
pub struct NineChroniclesTransferredEventSource<H> {
	client: Arc<H>,
	bridge_address: String,
}

impl<H> NineChroniclesTransferredEventSource<H> {
	pub fn new(client: Arc<H>, bridge_address: impl Into<String>) -> Self {
		Self {
			client,
			bridge_address: bridge_address.into(),
		}
	}
}

#[async_trait]
impl<H: HeadlessClientTrait> ChainEventSource for NineChroniclesTransferredEventSource<H> {
	type Event = NcgTransferredEvent;

	async fn block_index(&self, block_hash: &str) -> anyhow::Result<u64> {
		self.client.get_block_index(block_hash).await
	}

	async fn block_hash(&self, index: u64) -> anyhow::Result<String> {
		self.client.get_block_hash(index).await
	}

	async fn tip_index(&self) -> anyhow::Result<u64> {
		self.client.get_tip_index().await
	}

	async fn events(&self, index: u64) -> anyhow::Result<Vec<Located<NcgTransferredEvent>>> {
		let block_hash = self.client.get_block_hash(index).await?;
		self.client
			.get_ncg_transferred_events(&block_hash, &self.bridge_address)
			.await
	}
}

//! JSON-RPC over HTTP with fallback endpoints.
//!
//! The first configured URL that answers `net_version` becomes active; the remaining URLs are
//! kept as fallbacks in configuration order.

use anyhow::Context;
use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::{json, Value};
use url::Url;

use crate::{
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		TransportError,
	},
	utils::http::{build_base_client, create_retryable_http_client, RetryConfig},
};

#[derive(Clone, Debug)]
pub struct HttpTransportClient {
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
}

fn connection_probe() -> Value {
	json!({
		"jsonrpc": "2.0",
		"id": 1,
		"method": "net_version",
		"params": []
	})
}

async fn probe(client: &ClientWithMiddleware, url: &str) -> Result<(), anyhow::Error> {
	let url = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
	let response = client
		.post(url.clone())
		.json(&connection_probe())
		.send()
		.await
		.with_context(|| format!("Failed to connect to {}", url))?;

	if !response.status().is_success() {
		anyhow::bail!("Failed to connect to {}: {}", url, response.status().as_u16());
	}
	Ok(())
}

impl HttpTransportClient {
	pub async fn new(rpc_urls: &[String], retry: &RetryConfig) -> Result<Self, anyhow::Error> {
		let base_client =
			build_base_client(retry).context("Failed to create base HTTP client")?;
		let client =
			create_retryable_http_client(retry, base_client, Some(TransientErrorRetryStrategy));

		for (position, rpc_url) in rpc_urls.iter().enumerate() {
			if let Err(e) = probe(&client, rpc_url).await {
				tracing::warn!(url = %rpc_url, error = %e, "Skipping unreachable RPC endpoint");
				continue;
			}

			let fallback_urls = rpc_urls
				.iter()
				.enumerate()
				.filter(|(other, _)| *other != position)
				.map(|(_, url)| url.clone())
				.collect();

			return Ok(Self {
				client: client.clone(),
				endpoint_manager: EndpointManager::new(client, rpc_url, fallback_urls),
			});
		}

		Err(anyhow::anyhow!("All RPC URLs failed to connect"))
	}
}

#[async_trait]
impl BlockchainTransport for HttpTransportClient {
	async fn get_current_url(&self) -> String {
		self.endpoint_manager.active_url.read().await.clone()
	}

	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		self.endpoint_manager
			.send_raw_request(self, method, params)
			.await
	}
}

#[async_trait]
impl RotatingTransport for HttpTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		probe(&self.client, url).await
	}

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		let parsed = Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
		*self.endpoint_manager.active_url.write().await =
			parsed.as_str().trim_end_matches('/').to_string();
		Ok(())
	}
}

//! GraphQL over HTTP for the Nine Chronicles headless node.
//!
//! `method` is the GraphQL document and `params` its variables. Responses carrying a non-empty
//! `errors` array are turned into [`TransportError::Node`].

use anyhow::Context;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use url::Url;

use crate::{
	models::SecretString,
	services::blockchain::transports::{
		BlockchainTransport, EndpointManager, RotatingTransport, TransientErrorRetryStrategy,
		TransportError,
	},
	utils::http::{create_retryable_http_client, RetryConfig},
};

#[derive(Clone, Debug)]
pub struct GraphQLTransportClient {
	pub client: ClientWithMiddleware,
	endpoint_manager: EndpointManager,
}

impl GraphQLTransportClient {
	/// Creates a client for `endpoint`, sending `token` as a bearer token when given.
	pub fn new(
		endpoint: &str,
		token: Option<&SecretString>,
		retry: &RetryConfig,
	) -> Result<Self, anyhow::Error> {
		Url::parse(endpoint).with_context(|| format!("Invalid GraphQL endpoint: {}", endpoint))?;

		let mut headers = HeaderMap::new();
		if let Some(token) = token {
			let mut value = HeaderValue::from_str(&format!("Bearer {}", token.as_str()))
				.context("Token is not a valid header value")?;
			value.set_sensitive(true);
			headers.insert(AUTHORIZATION, value);
		}

		let base_client = reqwest::ClientBuilder::new()
			.timeout(retry.timeout)
			.default_headers(headers)
			.build()
			.context("Failed to create base HTTP client")?;
		let client =
			create_retryable_http_client(retry, base_client, Some(TransientErrorRetryStrategy));

		Ok(Self {
			client: client.clone(),
			endpoint_manager: EndpointManager::new(client, endpoint, Vec::new()),
		})
	}
}

/// Joins the `message` fields of a GraphQL `errors` array
fn error_messages(errors: &[Value]) -> String {
	errors
		.iter()
		.map(|error| {
			error
				.get("message")
				.and_then(Value::as_str)
				.map(str::to_string)
				.unwrap_or_else(|| error.to_string())
		})
		.collect::<Vec<_>>()
		.join("; ")
}

#[async_trait]
impl BlockchainTransport for GraphQLTransportClient {
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
		let response = self
			.endpoint_manager
			.send_raw_request(self, method, params)
			.await?;

		match response.get("errors").and_then(Value::as_array) {
			Some(errors) if !errors.is_empty() => Err(TransportError::node(
				error_messages(errors),
				None,
				Some(HashMap::from([(
					"url".to_string(),
					self.get_current_url().await,
				)])),
			)),
			_ => Ok(response),
		}
	}

	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"query": method,
			"variables": params.map(|p| p.into()).unwrap_or_else(|| json!({})),
		})
	}
}

#[async_trait]
impl RotatingTransport for GraphQLTransportClient {
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error> {
		let response = self
			.client
			.post(url)
			.json(&json!({ "query": "{ __typename }" }))
			.send()
			.await
			.with_context(|| format!("Failed to connect to {}", url))?;
		if !response.status().is_success() {
			anyhow::bail!("Failed to connect to {}: {}", url, response.status().as_u16());
		}
		Ok(())
	}

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error> {
		*self.endpoint_manager.active_url.write().await = url.to_string();
		Ok(())
	}
}

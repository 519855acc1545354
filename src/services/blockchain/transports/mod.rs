//! HTTP transports for the two chains the relay talks to.
//!
//! - [`HttpTransportClient`]: Ethereum JSON-RPC with fallback endpoints
//! - [`GraphQLTransportClient`]: the Nine Chronicles headless GraphQL endpoint
//!
//! Both share [`EndpointManager`], which posts request bodies to the active URL and rotates to a
//! fallback on network errors or rate limiting.

mod endpoint_manager;
mod error;
mod graphql;
mod http;

pub use endpoint_manager::EndpointManager;
pub use error::TransportError;
pub use graphql::GraphQLTransportClient;
pub use http::HttpTransportClient;

use reqwest_retry::{
	default_on_request_failure, default_on_request_success, Retryable, RetryableStrategy,
};
use serde::Serialize;
use serde_json::{json, Value};

/// HTTP status codes that make the endpoint manager switch to a fallback URL
pub const ROTATE_ON_ERROR_CODES: [u16; 1] = [429];

/// A request/response channel to a chain node
#[async_trait::async_trait]
pub trait BlockchainTransport: Send + Sync {
	async fn get_current_url(&self) -> String;

	/// Sends `method` with `params` and returns the decoded response body
	async fn send_raw_request<P>(
		&self,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize;

	/// Shapes the request body. JSON-RPC 2.0 unless overridden.
	async fn customize_request<P>(&self, method: &str, params: Option<P>) -> Value
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		json!({
			"jsonrpc": "2.0",
			"id": 1,
			"method": method,
			"params": params.map(|p| p.into())
		})
	}
}

/// A transport whose endpoint can be swapped at runtime
#[async_trait::async_trait]
pub trait RotatingTransport: BlockchainTransport {
	/// Checks that `url` answers before it becomes active
	async fn try_connect(&self, url: &str) -> Result<(), anyhow::Error>;

	async fn update_client(&self, url: &str) -> Result<(), anyhow::Error>;
}

/// Retries timeouts, connection errors, 5xx and 429 responses
pub struct TransientErrorRetryStrategy;

impl RetryableStrategy for TransientErrorRetryStrategy {
	fn handle(
		&self,
		res: &Result<reqwest::Response, reqwest_middleware::Error>,
	) -> Option<Retryable> {
		match res {
			Ok(success) => default_on_request_success(success),
			Err(error) => default_on_request_failure(error),
		}
	}
}

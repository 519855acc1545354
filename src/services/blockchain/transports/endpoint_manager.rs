//! Active/fallback endpoint bookkeeping.
//!
//! Every request goes to the active URL. A network error or a status in
//! [`ROTATE_ON_ERROR_CODES`] promotes the first fallback that answers `try_connect`, demoting the
//! failed URL to the back of the fallback list. A single request visits each configured URL at
//! most once.

use reqwest_middleware::ClientWithMiddleware;
use serde::Serialize;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{Mutex, RwLock};

use crate::services::blockchain::transports::{
	RotatingTransport, TransportError, ROTATE_ON_ERROR_CODES,
};

#[derive(Clone, Debug)]
pub struct EndpointManager {
	pub active_url: Arc<RwLock<String>>,
	pub fallback_urls: Arc<RwLock<Vec<String>>>,
	client: ClientWithMiddleware,
	rotation_lock: Arc<Mutex<()>>,
}

/// What a single POST to one URL produced
enum Attempt {
	Response(reqwest::Response),
	Network(reqwest_middleware::Error),
}

impl EndpointManager {
	pub fn new(client: ClientWithMiddleware, active_url: &str, fallback_urls: Vec<String>) -> Self {
		Self {
			active_url: Arc::new(RwLock::new(active_url.to_string())),
			fallback_urls: Arc::new(RwLock::new(fallback_urls)),
			client,
			rotation_lock: Arc::new(Mutex::new(())),
		}
	}

	/// Promotes the first reachable fallback to active and returns it.
	pub async fn try_rotate_url<T: RotatingTransport>(
		&self,
		transport: &T,
	) -> Result<String, TransportError> {
		let _guard = self.rotation_lock.lock().await;
		let previous = self.active_url.read().await.clone();
		let candidates: Vec<String> = self
			.fallback_urls
			.read()
			.await
			.iter()
			.filter(|url| **url != previous)
			.cloned()
			.collect();

		let mut failures = Vec::new();
		for candidate in candidates {
			if let Err(e) = transport.try_connect(&candidate).await {
				tracing::debug!(url = %candidate, error = %e, "Fallback endpoint unreachable");
				failures.push(candidate);
				continue;
			}
			transport.update_client(&candidate).await.map_err(|e| {
				TransportError::url_rotation(
					format!("Failed to switch transport to '{}'", candidate),
					Some(e.into()),
					None,
				)
			})?;

			let mut active = self.active_url.write().await;
			let mut fallbacks = self.fallback_urls.write().await;
			fallbacks.retain(|url| *url != candidate);
			fallbacks.push(previous.clone());
			*active = candidate.clone();

			tracing::info!(from = %previous, to = %candidate, "Rotated endpoint");
			return Ok(candidate);
		}

		Err(TransportError::url_rotation(
			format!("No reachable fallback for '{}'", previous),
			None,
			Some(HashMap::from([(
				"unreachable".to_string(),
				failures.join(","),
			)])),
		))
	}

	async fn post<P>(
		&self,
		url: &str,
		transport: &impl RotatingTransport,
		method: &str,
		params: Option<P>,
	) -> Result<Attempt, TransportError>
	where
		P: Into<Value> + Send + Clone + Serialize,
	{
		let body = transport.customize_request(method, params).await;
		let body = serde_json::to_string(&body).map_err(|e| {
			TransportError::request_serialization(
				"Failed to serialize request body",
				Some(Box::new(e)),
				Some(HashMap::from([("method".to_string(), method.to_string())])),
			)
		})?;

		Ok(
			match self
				.client
				.post(url)
				.header("Content-Type", "application/json")
				.body(body)
				.send()
				.await
			{
				Ok(response) => Attempt::Response(response),
				Err(e) => Attempt::Network(e),
			},
		)
	}

	/// Posts `method` to the active URL, rotating on network errors and rate limiting.
	pub async fn send_raw_request<T, P>(
		&self,
		transport: &T,
		method: &str,
		params: Option<P>,
	) -> Result<Value, TransportError>
	where
		T: RotatingTransport,
		P: Into<Value> + Send + Clone + Serialize,
	{
		let max_attempts = self.fallback_urls.read().await.len() + 1;
		let mut attempt = 0;

		loop {
			attempt += 1;
			let url = self.active_url.read().await.clone();
			tracing::trace!(%url, method, attempt, "Sending request");

			let failure = match self.post(&url, transport, method, params.clone()).await? {
				Attempt::Response(response) if response.status().is_success() => {
					return response.json().await.map_err(|e| {
						TransportError::response_parse(
							format!("Response to {} is not JSON", method),
							Some(Box::new(e)),
							Some(HashMap::from([("url".to_string(), url.clone())])),
						)
					});
				}
				Attempt::Response(response) => {
					let status = response.status();
					let body = response.text().await.unwrap_or_default();
					tracing::warn!(%url, %status, "Request failed");
					if !ROTATE_ON_ERROR_CODES.contains(&status.as_u16()) {
						return Err(TransportError::http(status, url, body, None, None));
					}
					TransportError::http(status, url, body, None, None)
				}
				Attempt::Network(e) => {
					tracing::warn!(%url, error = %e, "Network error");
					TransportError::network(
						format!("Request to {} failed", url),
						Some(Box::new(e)),
						None,
					)
				}
			};

			if attempt >= max_attempts {
				return Err(failure);
			}
			if let Err(rotation) = self.try_rotate_url(transport).await {
				tracing::debug!(error = %rotation, "Rotation after failure did not succeed");
				return Err(failure);
			}
		}
	}
}

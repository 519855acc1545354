//! Retrying HTTP clients shared by the JSON-RPC transport, the headless GraphQL client and the
//! Slack notifier.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{
	policies::ExponentialBackoff, Jitter, RetryTransientMiddleware, RetryableStrategy,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_max_retries() -> u32 {
	3
}

fn default_base_for_backoff() -> u32 {
	2
}

fn default_initial_backoff() -> Duration {
	Duration::from_millis(250)
}

fn default_max_backoff() -> Duration {
	Duration::from_secs(10)
}

fn default_timeout() -> Duration {
	Duration::from_secs(30)
}

/// Jitter applied to the exponential backoff
#[derive(Default, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
	None,
	#[default]
	Full,
}

/// Retry policy for outgoing HTTP requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RetryConfig {
	/// Retries after the first attempt
	#[serde(default = "default_max_retries")]
	pub max_retries: u32,
	#[serde(default = "default_base_for_backoff")]
	pub base_for_backoff: u32,
	#[serde(default = "default_initial_backoff")]
	pub initial_backoff: Duration,
	#[serde(default = "default_max_backoff")]
	pub max_backoff: Duration,
	#[serde(default)]
	pub jitter: JitterSetting,
	/// Per-request timeout
	#[serde(default = "default_timeout")]
	pub timeout: Duration,
}

impl Default for RetryConfig {
	fn default() -> Self {
		Self {
			max_retries: default_max_retries(),
			base_for_backoff: default_base_for_backoff(),
			initial_backoff: default_initial_backoff(),
			max_backoff: default_max_backoff(),
			jitter: JitterSetting::default(),
			timeout: default_timeout(),
		}
	}
}

impl RetryConfig {
	fn backoff_policy(&self) -> ExponentialBackoff {
		let builder = match self.jitter {
			JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
			JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
		};

		builder
			.base(self.base_for_backoff)
			.retry_bounds(self.initial_backoff, self.max_backoff)
			.build_with_max_retries(self.max_retries)
	}
}

/// Wraps `base_client` in a middleware stack that retries transient failures with exponential
/// backoff.
///
/// `custom_strategy` replaces the default classification of which responses are transient.
pub fn create_retryable_http_client<S>(
	config: &RetryConfig,
	base_client: reqwest::Client,
	custom_strategy: Option<S>,
) -> ClientWithMiddleware
where
	S: RetryableStrategy + Send + Sync + 'static,
{
	let retry_policy = config.backoff_policy();

	match custom_strategy {
		Some(strategy) => ClientBuilder::new(base_client).with(
			RetryTransientMiddleware::new_with_policy_and_strategy(retry_policy, strategy),
		),
		None => ClientBuilder::new(base_client)
			.with(RetryTransientMiddleware::new_with_policy(retry_policy)),
	}
	.build()
}

/// Builds the base reqwest client honouring the configured timeout
pub fn build_base_client(config: &RetryConfig) -> Result<reqwest::Client, reqwest::Error> {
	reqwest::ClientBuilder::new()
		.timeout(config.timeout)
		.pool_idle_timeout(Duration::from_secs(90))
		.build()
}

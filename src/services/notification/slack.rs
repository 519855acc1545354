//! Slack incoming-webhook notifier.

use async_trait::async_trait;
use reqwest_middleware::ClientWithMiddleware;
use std::{collections::HashMap, sync::Arc};

use crate::{
	models::{NotificationMessage, SecretString},
	services::notification::{
		payload_builder::{SlackPayloadBuilder, WebhookPayloadBuilder},
		NotificationError, Notifier,
	},
};

pub struct SlackNotifier {
	webhook_url: SecretString,
	client: Arc<ClientWithMiddleware>,
}

impl SlackNotifier {
	pub fn new(
		webhook_url: SecretString,
		client: Arc<ClientWithMiddleware>,
	) -> Result<Self, NotificationError> {
		url::Url::parse(webhook_url.as_str()).map_err(|e| {
			NotificationError::config_error("Invalid Slack webhook URL", Some(Box::new(e)), None)
		})?;
		Ok(Self {
			webhook_url,
			client,
		})
	}
}

#[async_trait]
impl Notifier for SlackNotifier {
	async fn post(&self, message: &NotificationMessage) -> Result<(), NotificationError> {
		let payload = SlackPayloadBuilder.build_payload(message);

		let response = self
			.client
			.post(self.webhook_url.as_str())
			.json(&payload)
			.send()
			.await
			.map_err(|e| {
				NotificationError::network_error(
					"Failed to send Slack notification",
					Some(e.into()),
					None,
				)
			})?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(NotificationError::notify_failed(
				format!("Slack webhook returned {}", status),
				None,
				Some(HashMap::from([
					("status".to_string(), status.as_u16().to_string()),
					("body".to_string(), body),
				])),
			));
		}

		tracing::debug!(title = %message.title, "Posted Slack notification");
		Ok(())
	}
}

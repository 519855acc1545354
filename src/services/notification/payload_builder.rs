//! Chat payload construction.

use serde_json::json;

use crate::models::NotificationMessage;

/// Turns a [`NotificationMessage`] into the JSON body a chat webhook expects
pub trait WebhookPayloadBuilder: Send + Sync {
	fn build_payload(&self, message: &NotificationMessage) -> serde_json::Value;
}

/// Slack block-kit payload: one markdown section with a bold title
#[derive(Debug, Default, Clone, Copy)]
pub struct SlackPayloadBuilder;

impl WebhookPayloadBuilder for SlackPayloadBuilder {
	fn build_payload(&self, message: &NotificationMessage) -> serde_json::Value {
		let text = format!("*{}*\n\n{}", message.title, message.body);
		json!({
			// Fallback for clients that cannot render blocks
			"text": message.title,
			"blocks": [
				{
					"type": "section",
					"text": {
						"type": "mrkdwn",
						"text": text
					}
				}
			]
		})
	}
}

//! Human-facing notifications.
//!
//! The relay posts a message to Slack for every burn it pays out and for every burn it fails to
//! pay out. Posting is best-effort: callers log failures and carry on.

use async_trait::async_trait;

use crate::models::NotificationMessage;

mod error;
pub mod messages;
pub mod payload_builder;
mod slack;

pub use error::NotificationError;
pub use messages::{UnwrappedEvent, UnwrappingFailureEvent};
pub use payload_builder::{SlackPayloadBuilder, WebhookPayloadBuilder};
pub use slack::SlackNotifier;

#[async_trait]
pub trait Notifier: Send + Sync {
	async fn post(&self, message: &NotificationMessage) -> Result<(), NotificationError>;
}

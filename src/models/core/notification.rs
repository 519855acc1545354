use serde::{Deserialize, Serialize};

/// A human-facing message: a short title and a markdown body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
	pub title: String,
	pub body: String,
}

impl NotificationMessage {
	pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
		Self {
			title: title.into(),
			body: body.into(),
		}
	}
}

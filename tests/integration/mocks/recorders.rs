use async_trait::async_trait;
use std::{sync::Mutex, time::Duration};
use tokio::sync::mpsc;

use bridge_relay::{
	services::observer::{Observer, ObserverError},
	utils::logging::reporter::ErrorReporter,
};

/// Keeps the message of every captured error
#[derive(Default)]
pub struct RecordingReporter {
	pub captured: Mutex<Vec<String>>,
}

impl RecordingReporter {
	pub fn count(&self) -> usize {
		self.captured.lock().unwrap().len()
	}
}

impl ErrorReporter for RecordingReporter {
	fn capture(&self, error: &(dyn std::error::Error + Send + Sync + 'static)) {
		self.captured.lock().unwrap().push(error.to_string());
	}
}

/// Forwards every delivered item into a channel
pub struct ChannelObserver<T> {
	sender: mpsc::UnboundedSender<T>,
}

impl<T> ChannelObserver<T> {
	pub fn new() -> (Self, mpsc::UnboundedReceiver<T>) {
		let (sender, receiver) = mpsc::unbounded_channel();
		(Self { sender }, receiver)
	}
}

#[async_trait]
impl<T: Clone + Send + Sync + 'static> Observer<T> for ChannelObserver<T> {
	async fn notify(&self, item: &T) -> Result<(), ObserverError> {
		let _ = self.sender.send(item.clone());
		Ok(())
	}
}

/// Receives the next item or panics after five seconds
pub async fn next_item<T>(receiver: &mut mpsc::UnboundedReceiver<T>) -> T {
	tokio::time::timeout(Duration::from_secs(5), receiver.recv())
		.await
		.expect("timed out waiting for an item")
		.expect("channel closed")
}

/// Asserts nothing arrives within `wait`
pub async fn assert_quiet<T: std::fmt::Debug>(
	receiver: &mut mpsc::UnboundedReceiver<T>,
	wait: Duration,
) {
	if let Ok(Some(item)) = tokio::time::timeout(wait, receiver.recv()).await {
		panic!("unexpected item {:?}", item);
	}
}

/// Polls `condition` every millisecond for up to five seconds
pub async fn eventually(mut condition: impl FnMut() -> bool) {
	tokio::time::timeout(Duration::from_secs(5), async {
		while !condition() {
			tokio::time::sleep(Duration::from_millis(1)).await;
		}
	})
	.await
	.expect("condition not met in time");
}

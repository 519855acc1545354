//! Publish/subscribe engine.
//!
//! A [`Monitor`] runs one producer task (a [`BatchSource`]) that writes into a bounded channel
//! and one dispatcher task that hands every item to each subscriber in subscription order. The
//! dispatcher awaits each `notify` before touching the next subscriber or item, so a slow
//! subscriber applies backpressure to the producer instead of reordering items.

use async_trait::async_trait;
use futures::future::join_all;
use std::{collections::HashMap, future::Future, sync::Arc};
use tokio::{
	sync::{mpsc, watch, Mutex, RwLock},
	task::JoinHandle,
};
use tracing::instrument;

use crate::{
	services::{monitor::error::MonitorError, observer::Observer},
	utils::logging::reporter::ErrorReporter,
};

const DEFAULT_CHANNEL_CAPACITY: usize = 16;

/// Produces the items a [`Monitor`] publishes.
///
/// Implementations run until `shutdown` turns `true` or `sink` is closed, checking `shutdown`
/// at every suspension point.
#[async_trait]
pub trait BatchSource<T>: Send {
	async fn run(self: Box<Self>, sink: mpsc::Sender<T>, shutdown: watch::Receiver<bool>);
}

/// Resolves once shutdown has been requested or the monitor has been dropped.
pub async fn shutdown_requested(shutdown: &mut watch::Receiver<bool>) {
	let _ = shutdown.wait_for(|stopped| *stopped).await;
}

/// Drives `future` unless shutdown is requested first, in which case `None` is returned and the
/// future is dropped.
pub async fn unless_shutdown<F: Future>(
	shutdown: &mut watch::Receiver<bool>,
	future: F,
) -> Option<F::Output> {
	tokio::select! {
		biased;
		_ = shutdown_requested(shutdown) => None,
		output = future => Some(output),
	}
}

type Subscribers<T> = Arc<RwLock<Vec<Arc<dyn Observer<T>>>>>;

/// Generic subscribe/run/stop engine
pub struct Monitor<T> {
	name: String,
	subscribers: Subscribers<T>,
	source: Mutex<Option<Box<dyn BatchSource<T>>>>,
	tasks: Mutex<Vec<JoinHandle<()>>>,
	shutdown: watch::Sender<bool>,
	reporter: Arc<dyn ErrorReporter>,
	channel_capacity: usize,
}

impl<T: Send + Sync + 'static> Monitor<T> {
	pub fn new(
		name: impl Into<String>,
		source: impl BatchSource<T> + 'static,
		reporter: Arc<dyn ErrorReporter>,
	) -> Self {
		let (shutdown, _) = watch::channel(false);
		Self {
			name: name.into(),
			subscribers: Arc::new(RwLock::new(Vec::new())),
			source: Mutex::new(Some(Box::new(source))),
			tasks: Mutex::new(Vec::new()),
			shutdown,
			reporter,
			channel_capacity: DEFAULT_CHANNEL_CAPACITY,
		}
	}

	/// Sets how many produced items may wait for the dispatcher
	pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
		self.channel_capacity = capacity.max(1);
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Registers `observer`. Later subscribers are notified after earlier ones. Subscribing while
	/// running takes effect from the next delivered item.
	pub async fn subscribe(&self, observer: Arc<dyn Observer<T>>) {
		self.subscribers.write().await.push(observer);
	}

	pub async fn subscriber_count(&self) -> usize {
		self.subscribers.read().await.len()
	}

	/// Spawns the producer and the dispatcher.
	///
	/// Fails with a processing error when called a second time.
	#[instrument(skip_all, fields(monitor = %self.name))]
	pub async fn run(&self) -> Result<(), MonitorError> {
		let Some(source) = self.source.lock().await.take() else {
			return Err(MonitorError::processing_error(
				"Monitor is already running",
				None,
				Some(HashMap::from([("monitor".to_string(), self.name.clone())])),
			));
		};

		let (sink, items) = mpsc::channel(self.channel_capacity);

		let producer = tokio::spawn(source.run(sink, self.shutdown.subscribe()));
		let dispatcher = tokio::spawn(dispatch(
			self.name.clone(),
			items,
			self.subscribers.clone(),
			self.shutdown.subscribe(),
			self.reporter.clone(),
		));

		self.tasks.lock().await.extend([producer, dispatcher]);
		tracing::info!("Monitor started");
		Ok(())
	}

	/// Requests shutdown and waits for both tasks to finish.
	///
	/// A `notify` already in progress completes; items still queued are dropped. Safe to call
	/// before `run`, after the tasks ended on their own, and more than once.
	#[instrument(skip_all, fields(monitor = %self.name))]
	pub async fn stop(&self) {
		self.shutdown.send_replace(true);

		let tasks: Vec<_> = self.tasks.lock().await.drain(..).collect();
		if tasks.is_empty() {
			return;
		}

		for result in join_all(tasks).await {
			if let Err(e) = result {
				tracing::error!(error = %e, "Monitor task ended abnormally");
			}
		}
		tracing::info!("Monitor stopped");
	}
}

async fn dispatch<T: Send + Sync + 'static>(
	name: String,
	mut items: mpsc::Receiver<T>,
	subscribers: Subscribers<T>,
	mut shutdown: watch::Receiver<bool>,
	reporter: Arc<dyn ErrorReporter>,
) {
	loop {
		let item = tokio::select! {
			biased;
			_ = shutdown_requested(&mut shutdown) => break,
			item = items.recv() => match item {
				Some(item) => item,
				None => break,
			},
		};

		// Snapshot so subscribe() never waits on a slow observer
		let observers = subscribers.read().await.clone();
		for (position, observer) in observers.iter().enumerate() {
			if let Err(e) = observer.notify(&item).await {
				let error = MonitorError::delivery_error(
					"Subscriber failed to handle item",
					Some(Box::new(e)),
					Some(HashMap::from([
						("monitor".to_string(), name.clone()),
						("subscriber".to_string(), position.to_string()),
					])),
				);
				reporter.capture(&error);
			}
		}
	}
	tracing::debug!(monitor = %name, "Dispatcher finished");
}

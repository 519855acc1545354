//! Confirmation-depth polling.
//!
//! [`ConfirmationMonitor`] publishes one [`EventBatch`] per block once the block is buried under
//! `confirmations` blocks. On startup it resumes from the last processed
//! [`TransactionLocation`]: the block of that location is re-read and only the events after the
//! recorded transaction are published. Without a location it starts at the current tip.
//!
//! Errors inside a polling tick are logged, reported and retried on the next tick; the cursor
//! never moves past a block whose batch was not handed to the dispatcher.

use async_trait::async_trait;
use std::{collections::HashMap, future::Future, ops::RangeInclusive, sync::Arc, time::Duration};
use tokio::sync::{mpsc, watch};
use tracing::instrument;

use crate::{
	models::{EventBatch, Located, TransactionLocation},
	services::monitor::{
		engine::{unless_shutdown, BatchSource},
		error::MonitorError,
	},
	utils::logging::reporter::ErrorReporter,
};

/// Default delay between polling ticks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// Chain queries the confirmation monitor is built on
#[async_trait]
pub trait ChainEventSource: Send + Sync {
	type Event: Send + Sync + 'static;

	/// Index of the block with `block_hash`. Fails for unknown hashes.
	async fn block_index(&self, block_hash: &str) -> anyhow::Result<u64>;

	/// Hash of the block at `index`. Fails beyond the tip.
	async fn block_hash(&self, index: u64) -> anyhow::Result<String>;

	/// Index of the current chain tip. Not guaranteed to be monotonic.
	async fn tip_index(&self) -> anyhow::Result<u64>;

	/// Matching events of the block at `index`, in on-chain order.
	async fn events(&self, index: u64) -> anyhow::Result<Vec<Located<Self::Event>>>;
}

/// Highest block index that may be published: `max(tip - confirmations, cursor)`.
pub fn confirmed_boundary(tip: u64, confirmations: u64, cursor: u64) -> u64 {
	tip.saturating_sub(confirmations).max(cursor)
}

/// Blocks to publish on a tick, or `None` when nothing new is final.
pub fn confirmed_range(tip: u64, confirmations: u64, cursor: u64) -> Option<RangeInclusive<u64>> {
	let boundary = confirmed_boundary(tip, confirmations, cursor);
	(cursor < boundary).then_some(cursor..=boundary)
}

/// Drops every event up to and including the one with `last_tx_id`.
///
/// With no `last_tx_id`, or one that is not in `events`, nothing is kept.
pub fn events_after<E>(events: Vec<Located<E>>, last_tx_id: Option<&str>) -> Vec<Located<E>> {
	let Some(last_tx_id) = last_tx_id else {
		return Vec::new();
	};
	match events.iter().position(|event| event.tx_id == last_tx_id) {
		Some(position) => events.into_iter().skip(position + 1).collect(),
		None => Vec::new(),
	}
}

/// Why a step stopped early
enum Interrupt {
	Shutdown,
	Failed(MonitorError),
}

impl From<MonitorError> for Interrupt {
	fn from(error: MonitorError) -> Self {
		Self::Failed(error)
	}
}

/// Confirmation-aware [`BatchSource`] over any [`ChainEventSource`]
pub struct ConfirmationMonitor<C: ChainEventSource> {
	name: String,
	chain: C,
	confirmations: u64,
	poll_interval: Duration,
	resume_from: Option<TransactionLocation>,
	reporter: Arc<dyn ErrorReporter>,
}

impl<C: ChainEventSource> ConfirmationMonitor<C> {
	pub fn new(
		name: impl Into<String>,
		chain: C,
		resume_from: Option<TransactionLocation>,
		confirmations: u64,
		reporter: Arc<dyn ErrorReporter>,
	) -> Self {
		Self {
			name: name.into(),
			chain,
			confirmations,
			poll_interval: DEFAULT_POLL_INTERVAL,
			resume_from,
			reporter,
		}
	}

	pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
		self.poll_interval = poll_interval;
		self
	}

	fn metadata(&self, extra: &[(&str, String)]) -> Option<HashMap<String, String>> {
		let mut metadata = HashMap::from([("monitor".to_string(), self.name.clone())]);
		metadata.extend(extra.iter().map(|(k, v)| (k.to_string(), v.clone())));
		Some(metadata)
	}

	/// Awaits a chain query, giving up on shutdown and wrapping failures.
	async fn query<T>(
		&self,
		shutdown: &mut watch::Receiver<bool>,
		what: &str,
		extra: &[(&str, String)],
		query: impl Future<Output = anyhow::Result<T>>,
	) -> Result<T, Interrupt> {
		match unless_shutdown(shutdown, query).await {
			None => Err(Interrupt::Shutdown),
			Some(Ok(value)) => Ok(value),
			Some(Err(e)) => Err(MonitorError::network_error(
				format!("Failed to fetch {}", what),
				Some(e.into()),
				self.metadata(extra),
			)
			.into()),
		}
	}

	async fn publish(
		&self,
		sink: &mpsc::Sender<EventBatch<C::Event>>,
		shutdown: &mut watch::Receiver<bool>,
		batch: EventBatch<C::Event>,
	) -> Result<(), Interrupt> {
		match unless_shutdown(shutdown, sink.send(batch)).await {
			Some(Ok(())) => Ok(()),
			// The dispatcher is gone, which only happens on shutdown
			Some(Err(_)) | None => Err(Interrupt::Shutdown),
		}
	}

	/// Establishes the first cursor, publishing the remainder of the resumed block if any.
	#[instrument(skip_all, fields(monitor = %self.name))]
	async fn start(
		&self,
		sink: &mpsc::Sender<EventBatch<C::Event>>,
		shutdown: &mut watch::Receiver<bool>,
	) -> Result<u64, Interrupt> {
		let Some(location) = &self.resume_from else {
			let tip = self
				.query(shutdown, "tip index", &[], self.chain.tip_index())
				.await?;
			tracing::info!(tip, "No previous location, starting at tip");
			return Ok(tip);
		};

		let block = [("block_hash", location.block_hash.clone())];
		let index = self
			.query(
				shutdown,
				"block index",
				&block,
				self.chain.block_index(&location.block_hash),
			)
			.await?;
		let events = self
			.query(shutdown, "events", &block, self.chain.events(index))
			.await?;

		let remaining = events_after(events, location.tx_id.as_deref());
		tracing::info!(
			index,
			tx_id = ?location.tx_id,
			remaining = remaining.len(),
			"Resuming from previous location"
		);

		self.publish(
			sink,
			shutdown,
			EventBatch::new(location.block_hash.clone(), remaining),
		)
		.await?;
		Ok(index + 1)
	}

	/// One polling step. Advances `cursor` past every published block.
	#[instrument(skip_all, fields(monitor = %self.name, cursor = *cursor))]
	async fn tick(
		&self,
		cursor: &mut u64,
		last_tip: &mut Option<u64>,
		sink: &mpsc::Sender<EventBatch<C::Event>>,
		shutdown: &mut watch::Receiver<bool>,
	) -> Result<(), Interrupt> {
		let tip = self
			.query(shutdown, "tip index", &[], self.chain.tip_index())
			.await?;

		if let Some(previous) = *last_tip {
			if tip < previous {
				tracing::warn!(previous, tip, "Chain tip moved backwards");
			}
		}
		*last_tip = Some(tip);

		let Some(range) = confirmed_range(tip, self.confirmations, *cursor) else {
			tracing::debug!(tip, "No newly confirmed blocks");
			return Ok(());
		};

		tracing::debug!(from = range.start(), to = range.end(), tip, "Publishing blocks");
		for index in range {
			let at = [("block_index", index.to_string())];
			let events = self
				.query(shutdown, "events", &at, self.chain.events(index))
				.await?;
			let block_hash = self
				.query(shutdown, "block hash", &at, self.chain.block_hash(index))
				.await?;

			self.publish(sink, shutdown, EventBatch::new(block_hash, events))
				.await?;
			*cursor = index + 1;
		}

		Ok(())
	}

	/// Sleeps for the poll interval. Returns false when shutdown interrupted the sleep.
	async fn pause(&self, shutdown: &mut watch::Receiver<bool>) -> bool {
		unless_shutdown(shutdown, tokio::time::sleep(self.poll_interval))
			.await
			.is_some()
	}
}

#[async_trait]
impl<C> BatchSource<EventBatch<C::Event>> for ConfirmationMonitor<C>
where
	C: ChainEventSource + 'static,
{
	async fn run(
		self: Box<Self>,
		sink: mpsc::Sender<EventBatch<C::Event>>,
		mut shutdown: watch::Receiver<bool>,
	) {
		let mut cursor = loop {
			match self.start(&sink, &mut shutdown).await {
				Ok(cursor) => break cursor,
				Err(Interrupt::Shutdown) => return,
				Err(Interrupt::Failed(e)) => {
					tracing::warn!("Resumption failed, retrying after poll interval");
					self.reporter.capture(&e);
				}
			}
			if !self.pause(&mut shutdown).await {
				return;
			}
		};

		let mut last_tip = None;
		loop {
			match self
				.tick(&mut cursor, &mut last_tip, &sink, &mut shutdown)
				.await
			{
				Ok(()) => {}
				Err(Interrupt::Shutdown) => return,
				Err(Interrupt::Failed(e)) => {
					tracing::warn!(cursor, "Tick failed, continuing with next tick");
					self.reporter.capture(&e);
				}
			}
			if !self.pause(&mut shutdown).await {
				return;
			}
		}
	}
}

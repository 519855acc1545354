//! Confirmation monitor behaviour against scripted chains.

use alloy::primitives::U256;
use std::{
	collections::{HashMap, VecDeque},
	sync::{
		atomic::{AtomicU64, AtomicUsize, Ordering},
		Arc, Mutex,
	},
	time::Duration,
};
use tokio::sync::mpsc;

use bridge_relay::{
	models::{BurnEvent, EventBatch, Located, TransactionLocation},
	services::monitor::{ConfirmationMonitor, Monitor},
};

use crate::integration::mocks::{
	assert_quiet, eventually, next_item, ChannelObserver, MockBurnChain, RecordingReporter,
};

const POLL: Duration = Duration::from_millis(5);

fn burn(block_hash: &str, tx_id: &str) -> Located<BurnEvent> {
	Located::new(
		block_hash,
		tx_id,
		BurnEvent {
			sender: "0x1111111111111111111111111111111111111111".to_string(),
			to: format!("0x{}", "ab".repeat(32)),
			amount: U256::from(1u64),
		},
	)
}

/// A chain whose tip follows `tips` (the last value repeats) and whose block hashes are the
/// decimal block indexes.
fn scripted_chain(tips: Vec<u64>, current_tip: Arc<AtomicU64>) -> MockBurnChain {
	let tips = Arc::new(Mutex::new(VecDeque::from(tips)));
	let mut chain = MockBurnChain::new();
	chain.expect_tip_index().returning(move || {
		let mut tips = tips.lock().unwrap();
		let tip = if tips.len() > 1 {
			tips.pop_front().unwrap()
		} else {
			*tips.front().unwrap()
		};
		current_tip.store(tip, Ordering::SeqCst);
		Ok(tip)
	});
	chain
		.expect_block_hash()
		.returning(|index| Ok(index.to_string()));
	chain
		.expect_block_index()
		.returning(|hash| Ok(hash.parse()?));
	chain
}

fn with_events(chain: &mut MockBurnChain, events: HashMap<u64, Vec<Located<BurnEvent>>>) {
	chain
		.expect_events()
		.returning(move |index| Ok(events.get(&index).cloned().unwrap_or_default()));
}

async fn start(
	chain: MockBurnChain,
	resume_from: Option<TransactionLocation>,
	confirmations: u64,
	reporter: Arc<RecordingReporter>,
) -> (
	Monitor<EventBatch<BurnEvent>>,
	mpsc::UnboundedReceiver<EventBatch<BurnEvent>>,
) {
	let source = ConfirmationMonitor::new(
		"test",
		chain,
		resume_from,
		confirmations,
		reporter.clone(),
	)
	.with_poll_interval(POLL);
	let monitor = Monitor::new("test", source, reporter);
	let (observer, batches) = ChannelObserver::<EventBatch<BurnEvent>>::new();
	monitor.subscribe(Arc::new(observer)).await;
	monitor.run().await.unwrap();
	(monitor, batches)
}

fn tx_ids(batch: &EventBatch<BurnEvent>) -> Vec<&str> {
	batch.events.iter().map(|e| e.tx_id.as_str()).collect()
}

#[tokio::test]
async fn test_first_block_delivered_exactly_once_without_confirmations() {
	let mut chain = scripted_chain(vec![0, 1], Arc::default());
	with_events(&mut chain, HashMap::new());

	let (monitor, mut batches) = start(chain, None, 0, Arc::default()).await;

	assert_eq!(next_item(&mut batches).await.block_hash, "0");
	assert_eq!(next_item(&mut batches).await.block_hash, "1");
	assert_quiet(&mut batches, Duration::from_millis(50)).await;

	monitor.stop().await;
}

#[tokio::test]
async fn test_waits_for_confirmations() {
	for confirmations in [0u64, 5] {
		let current_tip = Arc::new(AtomicU64::new(0));
		let mut chain = scripted_chain((0..=confirmations + 1).collect(), current_tip.clone());
		with_events(&mut chain, HashMap::new());

		let (monitor, mut batches) = start(chain, None, confirmations, Arc::default()).await;

		let first = next_item(&mut batches).await;
		assert_eq!(first.block_hash, "0");
		assert!(first.is_empty());
		assert!(current_tip.load(Ordering::SeqCst) >= confirmations + 1);

		assert_eq!(next_item(&mut batches).await.block_hash, "1");
		assert_quiet(&mut batches, Duration::from_millis(50)).await;

		monitor.stop().await;
	}
}

#[tokio::test]
async fn test_resumption_skips_processed_transactions() {
	let cases = [
		("TX-A", vec!["TX-B", "TX-C"]),
		("TX-B", vec!["TX-C"]),
		("TX-C", vec![]),
	];

	for (latest_tx_id, expected) in cases {
		let mut chain = scripted_chain(vec![0, 1, 2], Arc::default());
		with_events(
			&mut chain,
			HashMap::from([(
				0,
				vec![burn("0", "TX-A"), burn("0", "TX-B"), burn("0", "TX-C")],
			)]),
		);

		let resume = TransactionLocation::new("0", Some(latest_tx_id.to_string()));
		let (monitor, mut batches) = start(chain, Some(resume), 0, Arc::default()).await;

		let first = next_item(&mut batches).await;
		assert_eq!(first.block_hash, "0");
		assert_eq!(tx_ids(&first), expected, "resuming after {}", latest_tx_id);

		// The resumed block is never published again
		assert_eq!(next_item(&mut batches).await.block_hash, "1");
		assert_eq!(next_item(&mut batches).await.block_hash, "2");

		monitor.stop().await;
	}
}

#[tokio::test]
async fn test_resumption_without_transaction_or_with_unknown_transaction() {
	for tx_id in [None, Some("TX-Z".to_string())] {
		let mut chain = scripted_chain(vec![3], Arc::default());
		with_events(
			&mut chain,
			HashMap::from([(3, vec![burn("3", "TX-A"), burn("3", "TX-B")])]),
		);

		let resume = TransactionLocation::new("3", tx_id.clone());
		let (monitor, mut batches) = start(chain, Some(resume), 0, Arc::default()).await;

		let first = next_item(&mut batches).await;
		assert_eq!(first.block_hash, "3");
		assert!(first.is_empty(), "prior tx {:?}", tx_id);
		assert_quiet(&mut batches, Duration::from_millis(50)).await;

		monitor.stop().await;
	}
}

#[tokio::test]
async fn test_failed_tick_is_reported_and_retried() {
	let reporter = Arc::new(RecordingReporter::default());
	let calls = Arc::new(AtomicUsize::new(0));

	let mut chain = MockBurnChain::new();
	let counter = calls.clone();
	chain.expect_tip_index().returning(move || {
		match counter.fetch_add(1, Ordering::SeqCst) {
			0 => Ok(0),
			1 => Err(anyhow::anyhow!("connection reset")),
			_ => Ok(1),
		}
	});
	chain
		.expect_block_hash()
		.returning(|index| Ok(index.to_string()));
	with_events(&mut chain, HashMap::new());

	let (monitor, mut batches) = start(chain, None, 0, reporter.clone()).await;

	assert_eq!(next_item(&mut batches).await.block_hash, "0");
	assert_eq!(next_item(&mut batches).await.block_hash, "1");
	assert_eq!(reporter.count(), 1);
	assert!(reporter.captured.lock().unwrap()[0].contains("tip index"));

	monitor.stop().await;
}

#[tokio::test]
async fn test_failure_inside_range_does_not_skip_or_repeat_blocks() {
	let reporter = Arc::new(RecordingReporter::default());
	let mut chain = scripted_chain(vec![0, 2], Arc::default());

	let failed_once = Arc::new(AtomicUsize::new(0));
	chain.expect_events().returning(move |index| {
		if index == 1 && failed_once.fetch_add(1, Ordering::SeqCst) == 0 {
			return Err(anyhow::anyhow!("rate limited"));
		}
		Ok(vec![burn(&index.to_string(), &format!("TX-{}", index))])
	});

	let (monitor, mut batches) = start(chain, None, 0, reporter.clone()).await;

	for expected in ["0", "1", "2"] {
		let batch = next_item(&mut batches).await;
		assert_eq!(batch.block_hash, expected);
		assert_eq!(tx_ids(&batch), [format!("TX-{}", expected)]);
	}
	assert_quiet(&mut batches, Duration::from_millis(50)).await;
	assert_eq!(reporter.count(), 1);

	monitor.stop().await;
}

#[tokio::test]
async fn test_failed_resumption_is_retried() {
	let reporter = Arc::new(RecordingReporter::default());
	let mut chain = MockBurnChain::new();
	let attempts = Arc::new(AtomicUsize::new(0));
	let counter = attempts.clone();
	chain.expect_block_index().returning(move |hash| {
		if counter.fetch_add(1, Ordering::SeqCst) == 0 {
			return Err(anyhow::anyhow!("unknown block {}", hash));
		}
		Ok(hash.parse()?)
	});
	chain.expect_tip_index().returning(|| Ok(6));
	chain
		.expect_block_hash()
		.returning(|index| Ok(index.to_string()));
	with_events(&mut chain, HashMap::from([(4, vec![burn("4", "TX-A")])]));

	let resume = TransactionLocation::block("4");
	let (monitor, mut batches) = start(chain, Some(resume), 0, reporter.clone()).await;

	let first = next_item(&mut batches).await;
	assert_eq!(first.block_hash, "4");
	assert!(first.is_empty());
	assert_eq!(next_item(&mut batches).await.block_hash, "5");
	assert_eq!(next_item(&mut batches).await.block_hash, "6");
	assert_eq!(attempts.load(Ordering::SeqCst), 2);
	assert_eq!(reporter.count(), 1);

	monitor.stop().await;
}

#[tokio::test]
async fn test_tip_regression_does_not_change_output() {
	let mut chain = scripted_chain(vec![0, 3, 1, 5], Arc::default());
	with_events(&mut chain, HashMap::new());

	let (monitor, mut batches) = start(chain, None, 0, Arc::default()).await;

	for expected in ["0", "1", "2", "3", "4", "5"] {
		assert_eq!(next_item(&mut batches).await.block_hash, expected);
	}
	assert_quiet(&mut batches, Duration::from_millis(50)).await;

	monitor.stop().await;
}

#[tokio::test]
async fn test_stop_interrupts_poll_sleep() {
	let polls = Arc::new(AtomicUsize::new(0));
	let counter = polls.clone();
	let mut chain = MockBurnChain::new();
	chain.expect_tip_index().returning(move || {
		counter.fetch_add(1, Ordering::SeqCst);
		Ok(10)
	});

	let reporter = Arc::new(RecordingReporter::default());
	let source = ConfirmationMonitor::new("test", chain, None, 0, reporter.clone())
		.with_poll_interval(Duration::from_secs(3600));
	let monitor: Monitor<EventBatch<BurnEvent>> =
		Monitor::new("test", source, reporter);
	monitor.run().await.unwrap();

	eventually(|| polls.load(Ordering::SeqCst) >= 1).await;
	tokio::time::timeout(Duration::from_secs(1), monitor.stop())
		.await
		.expect("stop did not interrupt the poll interval");

	// Stopping again is harmless
	monitor.stop().await;
}

//! Burn payouts against mocked transfer, state and notification collaborators.

use alloy::primitives::U256;
use mockall::{predicate, Sequence};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Arc};

use bridge_relay::{
	models::{BurnEvent, EventBatch, Located, TransactionLocation},
	services::{
		monitor::events_after,
		notification::NotificationError,
		observer::{EthereumBurnEventObserver, Observer, ObserverError},
		state::{FileMonitorStateStore, MonitorStateStore, StateStoreError},
		transfer::TransferError,
	},
};

use crate::integration::mocks::{
	MockNotifier, MockStateStore, MockTransferService, RecordingReporter,
};

const SENDER: &str = "0x1111111111111111111111111111111111111111";
const RECIPIENT: &str = "0xabababababababababababababababababababab";

fn burn(tx_id: &str, raw_amount: &str) -> Located<BurnEvent> {
	Located::new(
		"0xblock",
		tx_id,
		BurnEvent {
			sender: SENDER.to_string(),
			to: format!("{}{}", RECIPIENT, "00".repeat(12)),
			amount: U256::from_str(raw_amount).unwrap(),
		},
	)
}

fn observer(
	transfer: MockTransferService,
	notifier: MockNotifier,
	store: MockStateStore,
	reporter: Arc<RecordingReporter>,
) -> EthereumBurnEventObserver {
	EthereumBurnEventObserver::new(
		Arc::new(transfer),
		Arc::new(notifier),
		Arc::new(store),
		reporter,
		"https://explorer.example/9c",
		"https://etherscan.io",
	)
}

#[tokio::test]
async fn test_empty_batch_checkpoints_whole_block() {
	let mut store = MockStateStore::new();
	store
		.expect_store()
		.with(
			predicate::eq("ethereum"),
			predicate::eq(TransactionLocation::block("0xempty")),
		)
		.times(1)
		.returning(|_, _| Ok(()));

	let mut transfer = MockTransferService::new();
	transfer.expect_transfer().never();
	let mut notifier = MockNotifier::new();
	notifier.expect_post().never();

	let observer = observer(transfer, notifier, store, Arc::default());
	observer
		.notify(&EventBatch::new("0xempty", vec![]))
		.await
		.unwrap();
}

#[tokio::test]
async fn test_successful_burn_is_transferred_checkpointed_and_announced() {
	let mut seq = Sequence::new();

	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.withf(|recipient, amount, nonce| {
			recipient == RECIPIENT
				&& *amount == Decimal::from_str("12.34").unwrap()
				&& nonce.is_none()
		})
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_, _, _| Ok("nc-tx-1".to_string()));

	let mut store = MockStateStore::new();
	store
		.expect_store()
		.with(
			predicate::eq("ethereum"),
			predicate::eq(TransactionLocation::new(
				"0xblock",
				Some("0xeth1".to_string()),
			)),
		)
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_, _| Ok(()));

	let mut notifier = MockNotifier::new();
	notifier
		.expect_post()
		.withf(|message| {
			message.title.contains("unwrapped")
				&& message.body.contains("12.34 NCG")
				&& message.body.contains("nc-tx-1")
				&& message.body.contains("0xeth1")
		})
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_| Ok(()));

	let observer = observer(transfer, notifier, store, Arc::default());
	let batch = EventBatch::new("0xblock", vec![burn("0xeth1", "12345678901234567890")]);
	observer.notify(&batch).await.unwrap();
}

#[tokio::test]
async fn test_failed_transfer_does_not_stop_the_batch_but_holds_the_checkpoint() {
	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.withf(|_, amount, _| *amount == Decimal::from_str("1.00").unwrap())
		.times(1)
		.returning(|_, _, _| {
			Err(TransferError::network_error(
				"headless unreachable",
				None,
				None,
			))
		});
	transfer
		.expect_transfer()
		.withf(|_, amount, _| *amount == Decimal::from_str("2.00").unwrap())
		.times(1)
		.returning(|_, _, _| Ok("nc-tx-2".to_string()));

	let mut store = MockStateStore::new();
	store.expect_store().never();

	let mut notifier = MockNotifier::new();
	notifier
		.expect_post()
		.withf(|message| {
			message.title.contains("failed")
				&& message.body.contains("0xeth1")
				&& message.body.contains("headless unreachable")
		})
		.times(1)
		.returning(|_| Ok(()));
	notifier
		.expect_post()
		.withf(|message| message.title.contains("unwrapped") && message.body.contains("0xeth2"))
		.times(1)
		.returning(|_| Ok(()));

	let observer = observer(transfer, notifier, store, Arc::default());
	let batch = EventBatch::new(
		"0xblock",
		vec![
			burn("0xeth1", "1000000000000000000"),
			burn("0xeth2", "2000000000000000000"),
		],
	);
	observer.notify(&batch).await.unwrap();
}

#[tokio::test]
async fn test_checkpoint_failure_after_transfer_is_reported() {
	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.times(1)
		.returning(|_, _, _| Ok("nc-tx".to_string()));

	let mut store = MockStateStore::new();
	store
		.expect_store()
		.times(1)
		.returning(|_, _| Err(StateStoreError::storage_error("disk full", None, None)));

	let mut notifier = MockNotifier::new();
	notifier
		.expect_post()
		.withf(|message| message.title.contains("unwrapped"))
		.times(1)
		.returning(|_| Ok(()));

	let reporter = Arc::new(RecordingReporter::default());
	let observer = observer(transfer, notifier, store, reporter.clone());
	let batch = EventBatch::new("0xblock", vec![burn("0xeth1", "1000000000000000000")]);

	observer.notify(&batch).await.unwrap();
	assert_eq!(reporter.count(), 1);
	assert!(reporter.captured.lock().unwrap()[0].contains("checkpoint"));
}

#[tokio::test]
async fn test_notification_failure_is_not_propagated() {
	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.times(1)
		.returning(|_, _, _| Ok("nc-tx".to_string()));
	let mut store = MockStateStore::new();
	store.expect_store().times(1).returning(|_, _| Ok(()));
	let mut notifier = MockNotifier::new();
	notifier
		.expect_post()
		.times(1)
		.returning(|_| Err(NotificationError::network_error("slack down", None, None)));

	let observer = observer(transfer, notifier, store, Arc::default());
	let batch = EventBatch::new("0xblock", vec![burn("0xeth1", "1000000000000000000")]);
	observer.notify(&batch).await.unwrap();
}

#[tokio::test]
async fn test_unrepresentable_amount_is_an_error_but_later_events_are_paid() {
	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.times(1)
		.returning(|_, _, _| Ok("nc-tx-2".to_string()));
	let mut store = MockStateStore::new();
	store.expect_store().never();
	let mut notifier = MockNotifier::new();
	notifier.expect_post().times(1).returning(|_| Ok(()));

	let observer = observer(transfer, notifier, store, Arc::default());
	let batch = EventBatch::new(
		"0xblock",
		vec![
			burn("0xeth1", &U256::MAX.to_string()),
			burn("0xeth2", "1000000000000000000"),
		],
	);

	let result = observer.notify(&batch).await;
	assert!(matches!(result, Err(ObserverError::ProcessingError(_))));
}

#[tokio::test]
async fn test_unpaid_burn_is_replayed_after_restart() {
	let dir = tempfile::tempdir().unwrap();
	let store = Arc::new(FileMonitorStateStore::new(dir.path()));
	store
		.store("ethereum", &TransactionLocation::block("0xprevious"))
		.await
		.unwrap();

	let mut transfer = MockTransferService::new();
	transfer
		.expect_transfer()
		.withf(|_, amount, _| *amount == Decimal::from_str("2.00").unwrap())
		.times(1)
		.returning(|_, _, _| Err(TransferError::network_error("nonce conflict", None, None)));
	transfer
		.expect_transfer()
		.times(2)
		.returning(|_, _, _| Ok("nc-tx".to_string()));
	let mut notifier = MockNotifier::new();
	notifier.expect_post().times(3).returning(|_| Ok(()));

	let observer = EthereumBurnEventObserver::new(
		Arc::new(transfer),
		Arc::new(notifier),
		store.clone(),
		Arc::new(RecordingReporter::default()),
		"https://explorer.example/9c",
		"https://etherscan.io",
	);
	let batch = EventBatch::new(
		"0xblock",
		vec![
			burn("0xeth1", "1000000000000000000"),
			burn("0xeth2", "2000000000000000000"),
			burn("0xeth3", "3000000000000000000"),
		],
	);
	observer.notify(&batch).await.unwrap();

	let stored = store.load("ethereum").await.unwrap().unwrap();
	assert_eq!(
		stored,
		TransactionLocation::new("0xblock", Some("0xeth1".to_string()))
	);

	let replayed = events_after(batch.events.clone(), stored.tx_id.as_deref());
	let replayed: Vec<_> = replayed.iter().map(|e| e.tx_id.as_str()).collect();
	assert_eq!(replayed, ["0xeth2", "0xeth3"]);
}

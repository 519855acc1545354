use mockall::{predicate, Sequence};
use rust_decimal::Decimal;
use std::{str::FromStr, sync::Arc};

use bridge_relay::services::transfer::{NcgTransfer, TransferError, TransferService};

use crate::integration::mocks::MockHeadlessClient;

const BRIDGE: &str = "0x9093dd96c4bb6b44a9e0a522e2de49641f146223";
const RECIPIENT: &str = "0x2734048ef43edc5b3dd11d8fae6e3d8a3f3e7a45";

fn amount(value: &str) -> Decimal {
	Decimal::from_str(value).unwrap()
}

#[tokio::test]
async fn test_transfer_looks_up_nonce_for_bridge_address() {
	let mut seq = Sequence::new();
	let mut client = MockHeadlessClient::new();
	client
		.expect_get_next_tx_nonce()
		.with(predicate::eq(BRIDGE))
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_| Ok(42));
	client
		.expect_transfer()
		.withf(|recipient, amount, nonce, memo| {
			recipient == RECIPIENT && amount == "12.34" && *nonce == 42 && memo.is_none()
		})
		.times(1)
		.in_sequence(&mut seq)
		.returning(|_, _, _, _| Ok("nc-tx".to_string()));

	let service = NcgTransfer::new(Arc::new(client), BRIDGE);
	let tx_id = service
		.transfer(RECIPIENT, &amount("12.34"), None)
		.await
		.unwrap();
	assert_eq!(tx_id, "nc-tx");
}

#[tokio::test]
async fn test_explicit_nonce_skips_lookup() {
	let mut client = MockHeadlessClient::new();
	client.expect_get_next_tx_nonce().never();
	client
		.expect_transfer()
		.withf(|_, _, nonce, _| *nonce == 7)
		.times(1)
		.returning(|_, _, _, _| Ok("nc-tx".to_string()));

	let service = NcgTransfer::new(Arc::new(client), BRIDGE);
	assert_eq!(
		service
			.transfer(RECIPIENT, &amount("1.00"), Some(7))
			.await
			.unwrap(),
		"nc-tx"
	);
}

#[tokio::test]
async fn test_non_positive_amount_is_rejected_without_calls() {
	let mut client = MockHeadlessClient::new();
	client.expect_get_next_tx_nonce().never();
	client.expect_transfer().never();

	let service = NcgTransfer::new(Arc::new(client), BRIDGE);
	for value in ["0", "0.00", "-1.50"] {
		let result = service.transfer(RECIPIENT, &amount(value), None).await;
		assert!(
			matches!(result, Err(TransferError::ValidationError(_))),
			"{} should be rejected",
			value
		);
	}
}

#[tokio::test]
async fn test_headless_failures_are_network_errors() {
	let mut client = MockHeadlessClient::new();
	client
		.expect_get_next_tx_nonce()
		.times(1)
		.returning(|_| Err(anyhow::anyhow!("connection refused")));
	client.expect_transfer().never();

	let service = NcgTransfer::new(Arc::new(client), BRIDGE);
	let result = service.transfer(RECIPIENT, &amount("1.00"), None).await;
	assert!(matches!(result, Err(TransferError::NetworkError(_))));

	let mut client = MockHeadlessClient::new();
	client
		.expect_transfer()
		.times(1)
		.returning(|_, _, _, _| Err(anyhow::anyhow!("stageTransaction rejected")));

	let service = NcgTransfer::new(Arc::new(client), BRIDGE);
	let error = service
		.transfer(RECIPIENT, &amount("1.00"), Some(3))
		.await
		.unwrap_err();
	assert!(matches!(error, TransferError::NetworkError(_)));
	assert!(error.to_string().contains("Failed to stage NCG transfer"));
}

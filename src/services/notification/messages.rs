//! Relay notification messages.
//!
//! Bodies are templates with `${name}` placeholders filled from a variable map, rendered as
//! Slack markdown (`<url|label>` links).

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::models::NotificationMessage;

const UNWRAPPED_TITLE: &str = "wNCG → NCG unwrapped";
const UNWRAPPED_BODY: &str = "\
*Sender (Ethereum):* <${etherscan_url}/address/${sender}|${sender}>
*Recipient (Nine Chronicles):* <${explorer_url}/account/?${recipient_query}|${recipient}>
*Amount:* ${amount} NCG
*Ethereum transaction:* <${etherscan_url}/tx/${eth_tx_id}|${eth_tx_id}>
*Nine Chronicles transaction:* <${explorer_url}/transaction/?${nc_tx_query}|${nc_tx_id}>";

const UNWRAPPING_FAILED_TITLE: &str = "wNCG → NCG unwrapping failed";
const UNWRAPPING_FAILED_BODY: &str = "\
*Sender (Ethereum):* <${etherscan_url}/address/${sender}|${sender}>
*Recipient (Nine Chronicles):* ${recipient}
*Amount:* ${amount} NCG
*Ethereum transaction:* <${etherscan_url}/tx/${eth_tx_id}|${eth_tx_id}>
*Error:*
```${error}```";

lazy_static! {
	static ref PLACEHOLDER: Regex = Regex::new(r"\$\{([A-Za-z0-9_]+)\}").unwrap();
}

/// Substitutes every `${key}` in `template` in a single pass. Unknown keys are left as they are
/// and substituted values are never expanded again.
pub fn format_template(template: &str, variables: &HashMap<&str, String>) -> String {
	PLACEHOLDER
		.replace_all(template, |captures: &Captures| {
			variables
				.get(&captures[1])
				.cloned()
				.unwrap_or_else(|| captures[0].to_string())
		})
		.into_owned()
}

fn trim_base(url: &str) -> String {
	url.trim_end_matches('/').to_string()
}

/// A burn on Ethereum was paid out on Nine Chronicles
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappedEvent<'a> {
	pub explorer_url: &'a str,
	pub etherscan_url: &'a str,
	pub sender: &'a str,
	pub recipient: &'a str,
	pub amount: &'a Decimal,
	pub nine_chronicles_tx_id: &'a str,
	pub ethereum_tx_id: &'a str,
}

impl UnwrappedEvent<'_> {
	pub fn render(&self) -> NotificationMessage {
		let variables = HashMap::from([
			("explorer_url", trim_base(self.explorer_url)),
			("etherscan_url", trim_base(self.etherscan_url)),
			("sender", self.sender.to_string()),
			("recipient", self.recipient.to_string()),
			(
				"recipient_query",
				urlencoding::encode(self.recipient).into_owned(),
			),
			("amount", self.amount.to_string()),
			("eth_tx_id", self.ethereum_tx_id.to_string()),
			("nc_tx_id", self.nine_chronicles_tx_id.to_string()),
			(
				"nc_tx_query",
				urlencoding::encode(self.nine_chronicles_tx_id).into_owned(),
			),
		]);
		NotificationMessage::new(UNWRAPPED_TITLE, format_template(UNWRAPPED_BODY, &variables))
	}
}

/// A burn could not be paid out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwrappingFailureEvent<'a> {
	pub etherscan_url: &'a str,
	pub sender: &'a str,
	pub recipient: &'a str,
	pub amount: &'a Decimal,
	pub ethereum_tx_id: &'a str,
	pub error: &'a str,
}

impl UnwrappingFailureEvent<'_> {
	pub fn render(&self) -> NotificationMessage {
		let variables = HashMap::from([
			("etherscan_url", trim_base(self.etherscan_url)),
			("sender", self.sender.to_string()),
			("recipient", self.recipient.to_string()),
			("amount", self.amount.to_string()),
			("eth_tx_id", self.ethereum_tx_id.to_string()),
			// Backticks would close the code block
			("error", self.error.replace('`', "'")),
		]);
		NotificationMessage::new(
			UNWRAPPING_FAILED_TITLE,
			format_template(UNWRAPPING_FAILED_BODY, &variables),
		)
	}
}

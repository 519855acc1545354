//! Property-based tests for notification templating.

use bridge_relay::services::notification::messages::format_template;
use proptest::{prelude::*, test_runner::Config};
use std::collections::HashMap;

fn variables_strategy() -> impl Strategy<Value = HashMap<String, String>> {
	prop::collection::hash_map("[a-z_]{1,10}", "[a-zA-Z0-9 .]{0,20}", 1..5)
}

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	/// Every known placeholder is replaced.
	#[test]
	fn test_known_placeholders_are_substituted(vars in variables_strategy()) {
		let template = vars
			.keys()
			.map(|key| format!("{}: ${{{}}}", key, key))
			.collect::<Vec<_>>()
			.join("\n");
		let variables: HashMap<&str, String> =
			vars.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();

		let formatted = format_template(&template, &variables);
		for (key, value) in &vars {
			let placeholder = format!("${{{}}}", key);
			prop_assert!(!formatted.contains(&placeholder));
			prop_assert!(formatted.contains(value.as_str()));
		}
	}

	/// Text without placeholders passes through untouched.
	#[test]
	fn test_plain_text_is_unchanged(text in "[a-zA-Z0-9 .,:*<>|/]{0,100}", vars in variables_strategy()) {
		let variables: HashMap<&str, String> =
			vars.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
		prop_assert_eq!(format_template(&text, &variables), text);
	}
}

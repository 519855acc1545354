//! Property-based tests for wNCG to NCG amount conversion.

use alloy::primitives::U256;
use bridge_relay::utils::{normalize_amount, NCG_PRECISION, WNCG_DECIMALS};
use proptest::{prelude::*, test_runner::Config};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	/// Conversion truncates: the result is at most the raw amount and loses less than one unit
	/// of the last kept digit.
	#[test]
	fn test_normalize_rounds_toward_zero(raw in any::<u128>()) {
		let raw = U256::from(raw);
		let amount = normalize_amount(raw, WNCG_DECIMALS, NCG_PRECISION).unwrap();

		prop_assert!(amount.scale() <= NCG_PRECISION);
		let unit = U256::from(10u64).pow(U256::from(WNCG_DECIMALS - amount.scale()));
		let kept = U256::from(amount.mantissa() as u128) * unit;
		let dropped_unit = U256::from(10u64).pow(U256::from(WNCG_DECIMALS - NCG_PRECISION));

		prop_assert!(kept <= raw);
		prop_assert!(raw - kept < dropped_unit);
	}

	/// Amounts are never negative and keep the NCG scale.
	#[test]
	fn test_normalize_keeps_scale(raw in any::<u64>()) {
		let amount = normalize_amount(U256::from(raw), WNCG_DECIMALS, NCG_PRECISION).unwrap();
		prop_assert!(!amount.is_sign_negative());
		prop_assert_eq!(amount.scale(), NCG_PRECISION);
	}
}

//! Token amount conversion between on-chain integer units and display decimals.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use thiserror::Error as ThisError;

/// Decimals of the wNCG ERC-20 token
pub const WNCG_DECIMALS: u32 = 18;

/// Decimals of NCG on Nine Chronicles
pub const NCG_PRECISION: u32 = 2;

#[derive(ThisError, Debug, PartialEq, Eq)]
pub enum AmountError {
	#[error("Amount {0} does not fit into a decimal")]
	Overflow(U256),
}

/// Converts a raw integer amount with `decimals` decimals into a [`Decimal`] with at most
/// `precision` fractional digits, rounding toward zero.
///
/// `normalize_amount(12345678901234567890, 18, 2)` is `12.34`.
pub fn normalize_amount(raw: U256, decimals: u32, precision: u32) -> Result<Decimal, AmountError> {
	let scale = precision.min(decimals);
	let divisor = U256::from(10u64).pow(U256::from(decimals - scale));
	let truncated = raw / divisor;

	let mantissa = u128::try_from(truncated)
		.ok()
		.and_then(|value| i128::try_from(value).ok())
		.ok_or(AmountError::Overflow(raw))?;

	Decimal::try_from_i128_with_scale(mantissa, scale).map_err(|_| AmountError::Overflow(raw))
}

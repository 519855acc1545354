//! Property-based tests for confirmation-depth polling.
//!
//! Replays generated tip sequences through the same arithmetic the monitor uses each tick and
//! checks that published ranges never reach into unconfirmed blocks, never overlap and never
//! leave gaps.

use bridge_relay::{
	models::Located,
	services::monitor::{confirmed_boundary, confirmed_range, events_after},
};
use proptest::{prelude::*, test_runner::Config};

use crate::properties::strategies::{tip_sequence_strategy, tx_ids_strategy};

proptest! {
	#![proptest_config(Config {
		failure_persistence: None,
		..Config::default()
	})]

	/// The boundary never falls behind the cursor and never passes `tip - confirmations` unless
	/// the cursor is already there.
	#[test]
	fn test_boundary_bounds(tip in any::<u64>(), confirmations in 0u64..100, cursor in any::<u64>()) {
		let boundary = confirmed_boundary(tip, confirmations, cursor);
		prop_assert!(boundary >= cursor);
		prop_assert!(boundary <= tip.saturating_sub(confirmations).max(cursor));
	}

	/// Over any sequence of observed tips the published blocks are exactly the contiguous run
	/// starting at the first cursor, and none of them is shallower than the confirmation depth.
	#[test]
	fn test_published_ranges_are_contiguous_and_confirmed(
		tips in tip_sequence_strategy(),
		confirmations in 0u64..20,
	) {
		let start = tips[0];
		let mut cursor = start;
		let mut published = Vec::new();

		for &tip in &tips[1..] {
			if let Some(range) = confirmed_range(tip, confirmations, cursor) {
				prop_assert_eq!(*range.start(), cursor);
				prop_assert!(*range.end() <= tip.saturating_sub(confirmations));
				let next = range.end() + 1;
				published.extend(range);
				prop_assert!(next > cursor);
				cursor = next;
			}
		}

		let expected: Vec<u64> = (start..cursor).collect();
		prop_assert_eq!(published, expected);
	}

	/// Resuming after a transaction keeps exactly the events that follow it.
	#[test]
	fn test_events_after_keeps_suffix(ids in tx_ids_strategy(), pick in any::<prop::sample::Index>()) {
		let events: Vec<Located<()>> = ids.iter().map(|id| Located::new("B", id.as_str(), ())).collect();
		let position = pick.index(ids.len());

		let remaining = events_after(events, Some(ids[position].as_str()));
		let remaining: Vec<&str> = remaining.iter().map(|e| e.tx_id.as_str()).collect();
		let expected: Vec<&str> = ids[position + 1..].iter().map(String::as_str).collect();
		prop_assert_eq!(remaining, expected);
	}

	/// An unknown or missing transaction id never lets an event through.
	#[test]
	fn test_events_after_unknown_id_keeps_nothing(ids in tx_ids_strategy()) {
		let events: Vec<Located<()>> = ids.iter().map(|id| Located::new("B", id.as_str(), ())).collect();
		prop_assert!(events_after(events.clone(), Some("not-a-tx")).is_empty());
		prop_assert!(events_after(events, None).is_empty());
	}
}

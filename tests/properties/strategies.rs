use proptest::prelude::*;

const MAX_TIPS: usize = 40;

/// Tip observations that mostly grow and occasionally move backwards
pub fn tip_sequence_strategy() -> impl Strategy<Value = Vec<u64>> {
	(
		0u64..1_000_000,
		prop::collection::vec(-3i64..20, 1..MAX_TIPS),
	)
		.prop_map(|(start, steps)| {
			let mut tip = start;
			let mut tips = vec![tip];
			for step in steps {
				tip = tip.saturating_add_signed(step);
				tips.push(tip);
			}
			tips
		})
}

/// Distinct transaction ids in block order
pub fn tx_ids_strategy() -> impl Strategy<Value = Vec<String>> {
	prop::collection::hash_set("0x[0-9a-f]{8}", 1..20)
		.prop_map(|ids| ids.into_iter().collect::<Vec<_>>())
		.prop_shuffle()
}

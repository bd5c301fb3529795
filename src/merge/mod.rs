//! Milestone merge engine
//!
//! Applies an ordered delta sequence to the milestone table in two passes:
//!
//! 1. **Propagate**: each delta is expanded to the full equivalence group of
//!    its crop and applied to every member present in the table, so a value
//!    confirmed for one variant seeds its untested siblings.
//! 2. **Correct**: the same sequence is replayed against the exact crop only,
//!    letting per-crop deltas override whatever pass 1 propagated there.
//!
//! Both passes share one apply rule: equal values are a no-op, and an
//! incoming value that merely matches the current value rounded to
//! [`SUPPRESSION_SIG_FIGS`] significant figures is treated as noise from a
//! low-precision historical source and skipped with a warning.
//!
//! The reported change count is a cell-by-cell diff of the table against its
//! pre-merge snapshot. The passes keep no counters of their own; pass 2 can
//! revert pass 1, and only net differences count.

use crate::crop;
use crate::delta::Delta;
use crate::table::MilestoneTable;

/// Precision of the noise-suppression round-match. An incoming amount equal
/// to the stored value rounded to this many significant figures is assumed
/// to be the same measurement quoted at lower precision.
pub const SUPPRESSION_SIG_FIGS: u32 = 2;

/// Errors for applying deltas to the table
#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("unknown crop {0:?} in delta source")]
    UnknownCrop(String),

    #[error("tier index {tier} out of range for {crop:?} ({len} tiers)")]
    TierIndexOutOfRange {
        crop: String,
        tier: usize,
        len: usize,
    },
}

/// A skipped low-precision delta, reported as a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suppression {
    pub crop: String,
    pub tier: usize,
    /// The higher-precision value kept in the table
    pub kept: u64,
    /// The incoming amount that round-matched it
    pub incoming: u64,
}

/// Result of a full two-pass merge
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Net number of cells that differ from the pre-merge snapshot
    pub updated: usize,
    /// Suppression warnings from both passes, in application order
    pub suppressions: Vec<Suppression>,
}

/// Round a non-negative integer to `figures` significant figures, half-up.
///
/// `round_sig(1_234_567, 2)` is `1_200_000`.
pub fn round_sig(value: u64, figures: u32) -> u64 {
    if value == 0 {
        return 0;
    }
    let digits = value.ilog10() + 1;
    if digits <= figures {
        return value;
    }
    let magnitude = 10u64.pow(digits - figures);
    (value + magnitude / 2) / magnitude * magnitude
}

/// Apply one amount to one table cell under the shared apply rule.
fn apply_cell(
    table: &mut MilestoneTable,
    crop: &str,
    tier: usize,
    amount: u64,
    suppressions: &mut Vec<Suppression>,
) -> Result<(), MergeError> {
    let tiers = table
        .get_mut(crop)
        .ok_or_else(|| MergeError::UnknownCrop(crop.to_string()))?;
    let len = tiers.len();
    let cell = tiers
        .get_mut(tier)
        .ok_or_else(|| MergeError::TierIndexOutOfRange {
            crop: crop.to_string(),
            tier,
            len,
        })?;

    if *cell == amount {
        return Ok(());
    }
    if round_sig(*cell, SUPPRESSION_SIG_FIGS) == amount {
        suppressions.push(Suppression {
            crop: crop.to_string(),
            tier,
            kept: *cell,
            incoming: amount,
        });
        return Ok(());
    }
    *cell = amount;
    Ok(())
}

/// Pass 1: apply each delta to every equivalence-group member present in the
/// table. The delta's own crop must exist; absent siblings are skipped.
pub fn propagate_pass(
    table: &mut MilestoneTable,
    deltas: &[Delta],
) -> Result<Vec<Suppression>, MergeError> {
    let mut suppressions = Vec::new();
    for delta in deltas {
        if !table.contains_key(&delta.crop) {
            return Err(MergeError::UnknownCrop(delta.crop.clone()));
        }
        for member in crop::equivalence_group(&delta.crop) {
            if table.contains_key(member) {
                apply_cell(table, member, delta.tier, delta.amount, &mut suppressions)?;
            }
        }
    }
    Ok(suppressions)
}

/// Pass 2: replay the same sequence against the exact crop only.
pub fn exact_pass(
    table: &mut MilestoneTable,
    deltas: &[Delta],
) -> Result<Vec<Suppression>, MergeError> {
    let mut suppressions = Vec::new();
    for delta in deltas {
        apply_cell(table, &delta.crop, delta.tier, delta.amount, &mut suppressions)?;
    }
    Ok(suppressions)
}

/// Count the cells of `after` that differ from `before`.
pub fn diff_count(before: &MilestoneTable, after: &MilestoneTable) -> usize {
    after
        .iter()
        .map(|(crop, tiers)| match before.get(crop) {
            Some(old) => tiers
                .iter()
                .enumerate()
                .filter(|(i, value)| old.get(*i) != Some(*value))
                .count(),
            None => tiers.len(),
        })
        .sum()
}

/// Run the full two-pass merge and report the net change count against the
/// table's pre-merge state.
pub fn merge(table: &mut MilestoneTable, deltas: &[Delta]) -> Result<MergeOutcome, MergeError> {
    let snapshot = table.clone();

    let mut suppressions = propagate_pass(table, deltas)?;
    suppressions.extend(exact_pass(table, deltas)?);

    Ok(MergeOutcome {
        updated: diff_count(&snapshot, table),
        suppressions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(crop: &str, tier: usize, amount: u64) -> Delta {
        Delta {
            crop: crop.to_string(),
            tier,
            amount,
        }
    }

    fn table(entries: &[(&str, &[u64])]) -> MilestoneTable {
        entries
            .iter()
            .map(|(crop, tiers)| (crop.to_string(), tiers.to_vec()))
            .collect()
    }

    #[test]
    fn test_round_sig_basic() {
        assert_eq!(round_sig(1_234_567, 2), 1_200_000);
        assert_eq!(round_sig(1_250_000, 2), 1_300_000);
        assert_eq!(round_sig(999, 2), 1_000);
        assert_eq!(round_sig(42, 2), 42);
        assert_eq!(round_sig(0, 2), 0);
    }

    #[test]
    fn test_empty_deltas_change_nothing() {
        let mut t = table(&[("MELON", &[10, 20, 30])]);
        let outcome = merge(&mut t, &[]).unwrap();
        assert_eq!(outcome.updated, 0);
        assert_eq!(t, table(&[("MELON", &[10, 20, 30])]));
    }

    #[test]
    fn test_equal_value_is_noop() {
        let mut t = table(&[("MELON", &[10, 20, 30])]);
        let outcome = merge(&mut t, &[delta("MELON", 1, 20)]).unwrap();
        assert_eq!(outcome.updated, 0);
        assert!(outcome.suppressions.is_empty());
    }

    #[test]
    fn test_low_precision_value_suppressed() {
        let mut t = table(&[("MELON", &[0, 1_234_567])]);
        let outcome = merge(&mut t, &[delta("MELON", 1, 1_200_000)]).unwrap();

        assert_eq!(outcome.updated, 0);
        assert_eq!(t["MELON"][1], 1_234_567);
        // Two suppressions: one per pass, the delta is replayed.
        assert_eq!(outcome.suppressions.len(), 2);
        assert_eq!(outcome.suppressions[0].kept, 1_234_567);
        assert_eq!(outcome.suppressions[0].incoming, 1_200_000);
    }

    #[test]
    fn test_close_but_not_round_matching_value_applies() {
        let mut t = table(&[("MELON", &[0, 1_234_567])]);
        let outcome = merge(&mut t, &[delta("MELON", 1, 1_230_000)]).unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(t["MELON"][1], 1_230_000);
        assert!(outcome.suppressions.is_empty());
    }

    #[test]
    fn test_propagation_to_group_siblings() {
        let mut t = table(&[
            ("WHEAT", &[0, 0, 0, 0][..]),
            ("CARROT_ITEM", &[0, 0, 0, 0][..]),
        ]);
        let outcome = merge(&mut t, &[delta("WHEAT", 3, 500)]).unwrap();

        assert_eq!(t["WHEAT"][3], 500);
        assert_eq!(t["CARROT_ITEM"][3], 500);
        assert_eq!(outcome.updated, 2);
    }

    #[test]
    fn test_exact_pass_corrects_propagated_value() {
        let mut t = table(&[
            ("WHEAT", &[0, 0, 0, 0][..]),
            ("CARROT_ITEM", &[0, 0, 0, 0][..]),
        ]);
        let deltas = [delta("WHEAT", 3, 500), delta("CARROT_ITEM", 3, 300)];
        let outcome = merge(&mut t, &deltas).unwrap();

        // Pass 1 propagates 500 to both, then 300 to both; pass 2 restores
        // each crop's own delta.
        assert_eq!(t["WHEAT"][3], 500);
        assert_eq!(t["CARROT_ITEM"][3], 300);
        assert_eq!(outcome.updated, 2);
    }

    #[test]
    fn test_propagation_skips_absent_siblings() {
        let mut t = table(&[("WHEAT", &[0, 0, 0, 0, 0])]);
        let outcome = merge(&mut t, &[delta("WHEAT", 4, 350)]).unwrap();

        assert_eq!(t["WHEAT"][4], 350);
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn test_unknown_crop_is_fatal() {
        let mut t = table(&[("MELON", &[10])]);
        let result = merge(&mut t, &[delta("BAMBOO", 0, 5)]);
        assert!(matches!(result, Err(MergeError::UnknownCrop(c)) if c == "BAMBOO"));
    }

    #[test]
    fn test_tier_out_of_range_is_fatal() {
        let mut t = table(&[("MELON", &[10, 20])]);
        let result = merge(&mut t, &[delta("MELON", 5, 99)]);
        assert!(matches!(
            result,
            Err(MergeError::TierIndexOutOfRange { tier: 5, len: 2, .. })
        ));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut t = table(&[
            ("WHEAT", &[0, 0, 0, 0][..]),
            ("CARROT_ITEM", &[0, 0, 0, 0][..]),
            ("MELON", &[0, 1_234_567][..]),
        ]);
        let deltas = [
            delta("WHEAT", 3, 500),
            delta("CARROT_ITEM", 3, 300),
            delta("MELON", 1, 1_200_000),
        ];

        let first = merge(&mut t, &deltas).unwrap();
        assert!(first.updated > 0);

        let second = merge(&mut t, &deltas).unwrap();
        assert_eq!(second.updated, 0);
    }

    #[test]
    fn test_net_count_ignores_reverted_cells() {
        let mut t = table(&[
            ("WHEAT", &[0][..]),
            ("CARROT_ITEM", &[0][..]),
        ]);
        let deltas = [delta("WHEAT", 0, 500), delta("CARROT_ITEM", 0, 0)];
        let outcome = merge(&mut t, &deltas).unwrap();

        // CARROT_ITEM was pushed to 500 by propagation and back to 0 by its
        // own delta; only WHEAT differs from the snapshot.
        assert_eq!(t["WHEAT"][0], 500);
        assert_eq!(t["CARROT_ITEM"][0], 0);
        assert_eq!(outcome.updated, 1);
    }

    #[test]
    fn test_diff_count_cell_by_cell() {
        let before = table(&[("A", &[1, 2, 3][..]), ("B", &[4][..])]);
        let after = table(&[("A", &[1, 9, 3][..]), ("B", &[5][..])]);
        assert_eq!(diff_count(&before, &after), 2);
        assert_eq!(diff_count(&before, &before), 0);
    }
}

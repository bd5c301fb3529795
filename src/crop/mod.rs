//! Crop identifier normalization and equivalence groups
//!
//! Canonical crop identifiers are the keys used by `crop_milestones` in
//! Garden.json: uppercase with spaces replaced by underscores. Human-facing
//! names that don't follow that convention are handled by an explicit alias
//! table, consulted before the mechanical transformation.

/// Human name -> canonical identifier aliases, checked before the
/// uppercase/underscore fallback.
const CROP_ALIASES: &[(&str, &str)] = &[("Melon Slice", "MELON")];

/// Legacy crop names whose data predates the current tracker and is not
/// trustworthy. Deltas for these are discarded outright.
const LEGACY_CROPS: &[&str] = &["SEEDS"];

/// Crops that share identical milestone curves. A confirmed value for one
/// member is expected to hold for the others. Crops not listed here are
/// singletons.
const EQUIVALENT_CROPS: &[&[&str]] = &[
    &["WHEAT", "CARROT_ITEM", "POTATO_ITEM", "NETHER_STALK"],
    &["PUMPKIN", "MUSHROOM_COLLECTION"],
    &["CACTUS", "SUGAR_CANE"],
];

/// Canonicalize a free-text crop name to its table identifier.
pub fn canonical_id(name: &str) -> String {
    for (alias, id) in CROP_ALIASES {
        if *alias == name {
            return (*id).to_string();
        }
    }
    name.replace(' ', "_").to_uppercase()
}

/// Whether a canonical identifier is a legacy name whose deltas are dropped.
pub fn is_legacy(crop_id: &str) -> bool {
    LEGACY_CROPS.contains(&crop_id)
}

/// The full equivalence group containing `crop_id`, or the singleton group
/// of just `crop_id` if it is ungrouped.
pub fn equivalence_group(crop_id: &str) -> Vec<&str> {
    for group in EQUIVALENT_CROPS {
        if group.contains(&crop_id) {
            return group.to_vec();
        }
    }
    vec![crop_id]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_id_alias() {
        assert_eq!(canonical_id("Melon Slice"), "MELON");
    }

    #[test]
    fn test_canonical_id_fallback() {
        assert_eq!(canonical_id("Sugar Cane"), "SUGAR_CANE");
        assert_eq!(canonical_id("Wheat"), "WHEAT");
        assert_eq!(canonical_id("WHEAT"), "WHEAT");
    }

    #[test]
    fn test_legacy_name() {
        assert!(is_legacy("SEEDS"));
        assert!(!is_legacy("WHEAT"));
    }

    #[test]
    fn test_equivalence_group_member() {
        let group = equivalence_group("WHEAT");
        assert!(group.contains(&"WHEAT"));
        assert!(group.contains(&"CARROT_ITEM"));
        assert!(group.contains(&"POTATO_ITEM"));
        assert!(group.contains(&"NETHER_STALK"));
    }

    #[test]
    fn test_equivalence_group_singleton() {
        assert_eq!(equivalence_group("MELON"), vec!["MELON"]);
    }

    #[test]
    fn test_groups_are_disjoint() {
        let mut seen = std::collections::HashSet::new();
        for group in EQUIVALENT_CROPS {
            for crop in *group {
                assert!(seen.insert(*crop), "{} appears in two groups", crop);
            }
        }
    }
}

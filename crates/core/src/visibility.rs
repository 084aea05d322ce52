//! Visibility resolver.
//!
//! Decides whether a field is rendered at the tier chosen by the data collector. The `all`
//! tier is a catch-all: it shows every path, including ones the table does not classify.

use crate::classification::{ClassificationTable, Tier};
use oncoreg_types::FieldPath;

/// Returns true when `path` should be shown at `tier`.
///
/// Unclassified and malformed paths are hidden at `mandatory` and `recommended`.
pub fn is_visible(table: &ClassificationTable, path: &FieldPath, tier: Tier) -> bool {
    if tier == Tier::All {
        return true;
    }

    match table.classify(path) {
        Some(classification) => tier.admits(classification),
        None => false,
    }
}

/// [`is_visible`] for raw path strings coming from a rendering layer.
pub fn is_visible_str(table: &ClassificationTable, path: &str, tier: Tier) -> bool {
    if tier == Tier::All {
        return true;
    }

    table
        .classify_str(path)
        .is_some_and(|classification| tier.admits(classification))
}

#[cfg(test)]
mod tests {
    use super::*;
    use oncoreg_types::Classification;

    fn table() -> ClassificationTable {
        ClassificationTable::builder()
            .field("centreName", Classification::Mandatory)
            .field("dateOfRegistration", Classification::Recommended)
            .field("religion", Classification::Optional)
            .group("tnm", |g| g.field("t", Classification::Recommended))
            .build()
            .expect("valid table")
    }

    const PATHS: [&str; 7] = [
        "centreName",
        "dateOfRegistration",
        "religion",
        "tnm.t",
        "tnm",
        "notDeclared",
        "centreName.inner",
    ];

    #[test]
    fn visibility_is_monotonic_in_tier() {
        let table = table();
        for path in PATHS {
            for (i, lower) in Tier::ORDERED.iter().enumerate() {
                for higher in &Tier::ORDERED[i..] {
                    if is_visible_str(&table, path, *lower) {
                        assert!(is_visible_str(&table, path, *higher), "{path} at {higher}");
                    }
                }
            }
        }
    }

    #[test]
    fn all_tier_shows_everything() {
        let table = table();
        for path in PATHS {
            assert!(is_visible_str(&table, path, Tier::All), "{path}");
        }
        assert!(is_visible_str(&table, "not a path!", Tier::All));
    }

    #[test]
    fn tiers_follow_classification() {
        let table = table();
        let centre = FieldPath::parse("centreName").expect("path");
        let registered = FieldPath::parse("dateOfRegistration").expect("path");
        let religion = FieldPath::parse("religion").expect("path");

        assert!(is_visible(&table, &centre, Tier::Mandatory));
        assert!(!is_visible(&table, &registered, Tier::Mandatory));
        assert!(is_visible(&table, &registered, Tier::Recommended));
        assert!(!is_visible(&table, &religion, Tier::Recommended));
        assert!(is_visible(&table, &religion, Tier::All));
    }

    #[test]
    fn unclassified_paths_fail_closed() {
        let table = table();
        for path in ["notDeclared", "tnm", "centreName.inner", "tnm..t", ""] {
            assert!(!is_visible_str(&table, path, Tier::Mandatory), "{path}");
            assert!(!is_visible_str(&table, path, Tier::Recommended), "{path}");
        }
    }
}

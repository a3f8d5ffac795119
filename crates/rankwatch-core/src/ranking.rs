//! Store-link derivation and position resolution against a ranked result list.

const STORE_DETAILS_URL: &str = "https://play.google.com/store/apps/details?id=";

/// Derives the canonical store URL for an app from its package identifier.
///
/// This is the identifier the Fetch Channel extracts from search results, so
/// position resolution compares like with like.
#[must_use]
pub fn store_link(package_id: &str) -> String {
    format!("{STORE_DETAILS_URL}{package_id}")
}

/// Returns the 1-based rank of `link` in `ranked`, or 0 when absent.
///
/// Duplicate identifiers are tolerated; the first occurrence wins.
#[must_use]
pub fn rank_of(ranked: &[String], link: &str) -> i32 {
    ranked
        .iter()
        .position(|candidate| candidate == link)
        .map_or(0, |index| i32::try_from(index + 1).unwrap_or(i32::MAX))
}

/// Resolves each target link against the ranked list, in target order.
///
/// An empty ranked list resolves every target to 0; an empty target set
/// resolves to an empty vector.
#[must_use]
pub fn resolve_positions(ranked: &[String], targets: &[String]) -> Vec<i32> {
    targets.iter().map(|link| rank_of(ranked, link)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(links: &[&str]) -> Vec<String> {
        links.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn store_link_appends_package_id() {
        assert_eq!(
            store_link("com.example.app"),
            "https://play.google.com/store/apps/details?id=com.example.app"
        );
    }

    #[test]
    fn rank_is_one_based() {
        let list = ranked(&["a", "b", "c"]);
        assert_eq!(rank_of(&list, "a"), 1);
        assert_eq!(rank_of(&list, "c"), 3);
    }

    #[test]
    fn absent_link_resolves_to_zero() {
        let list = ranked(&["a", "b"]);
        assert_eq!(rank_of(&list, "z"), 0);
    }

    #[test]
    fn duplicate_identifiers_use_first_occurrence() {
        let list = ranked(&["a", "b", "a"]);
        assert_eq!(rank_of(&list, "a"), 1);
    }

    #[test]
    fn empty_ranked_list_resolves_all_zero() {
        let targets = ranked(&["a", "b"]);
        assert_eq!(resolve_positions(&[], &targets), vec![0, 0]);
    }

    #[test]
    fn empty_target_set_resolves_to_empty() {
        let list = ranked(&["a"]);
        assert!(resolve_positions(&list, &[]).is_empty());
    }

    #[test]
    fn resolves_targets_in_order() {
        let list = ranked(&["x", "y", "z"]);
        let targets = ranked(&["z", "missing", "x"]);
        assert_eq!(resolve_positions(&list, &targets), vec![3, 0, 1]);
    }
}

//! Substring search and relevance ranking over a catalog snapshot.

use crate::protocol::CatalogItem;

// Items matched only through category or device sort after every name match.
const METADATA_MATCH_RANK: usize = usize::MAX;

fn normalize(text: &str) -> String {
    text.trim().to_lowercase()
}

fn name_rank(item: &CatalogItem, term: &str) -> usize {
    normalize(&item.name)
        .find(term)
        .unwrap_or(METADATA_MATCH_RANK)
}

fn matches_term(item: &CatalogItem, term: &str) -> bool {
    if normalize(&item.name).contains(term) {
        return true;
    }
    if let Some(category) = item.category.as_deref() {
        if normalize(category).contains(term) {
            return true;
        }
    }
    item.device
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|label| normalize(label).contains(term))
}

/// Filters and ranks catalog items for a query.
///
/// The query is lowercased and trimmed; an empty result of that returns
/// every item in catalog order. Matches are ordered by the first occurrence
/// of the term in the item name, earliest first. Items matched only through
/// category or device metadata sort after all name matches. Ties keep
/// catalog order.
pub fn search_catalog(items: &[CatalogItem], query: &str) -> Vec<CatalogItem> {
    let term = normalize(query);
    if term.is_empty() {
        return items.to_vec();
    }
    let mut ranked: Vec<(usize, &CatalogItem)> = items
        .iter()
        .filter(|item| matches_term(item, &term))
        .map(|item| (name_rank(item, &term), item))
        .collect();
    ranked.sort_by_key(|(rank, _)| *rank); // stable sort, ties keep catalog order
    ranked.into_iter().map(|(_, item)| item.clone()).collect()
}

#[cfg(test)]
mod tests {
    use crate::protocol::CatalogItem;

    use super::search_catalog;

    fn item(number: i64, name: &str) -> CatalogItem {
        CatalogItem {
            number,
            name: name.to_string(),
            category: None,
            device: None,
            link: None,
        }
    }

    fn numbers(items: &[CatalogItem]) -> Vec<i64> {
        items.iter().map(|item| item.number).collect()
    }

    #[test]
    fn test_search_orders_by_first_match_position_in_name() {
        let catalog = vec![item(1, "Alpha Run"), item(2, "Beta Alpha"), item(3, "Gamma")];

        let results = search_catalog(&catalog, "alpha");

        assert_eq!(numbers(&results), vec![1, 2]);
    }

    #[test]
    fn test_empty_and_whitespace_queries_return_catalog_order() {
        let catalog = vec![item(4, "Drift"), item(2, "Ascent"), item(9, "Breaker")];

        assert_eq!(numbers(&search_catalog(&catalog, "")), vec![4, 2, 9]);
        assert_eq!(numbers(&search_catalog(&catalog, "   ")), vec![4, 2, 9]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_trims_the_query() {
        let catalog = vec![item(1, "Night Parade")];

        assert_eq!(numbers(&search_catalog(&catalog, "  PARADE ")), vec![1]);
    }

    #[test]
    fn test_metadata_only_matches_sort_after_name_matches() {
        let mut puzzle = item(1, "Block Stack");
        puzzle.category = Some("Puzzle".to_string());
        let named = item(2, "Puzzle Express");
        let mut handheld = item(3, "Circuit Run");
        handheld.device = Some(vec!["puzzle-pad".to_string()]);
        let catalog = vec![puzzle, named, handheld];

        let results = search_catalog(&catalog, "puzzle");

        // Name match first, then metadata matches in catalog order.
        assert_eq!(numbers(&results), vec![2, 1, 3]);
    }

    #[test]
    fn test_name_position_ties_keep_catalog_order() {
        let catalog = vec![item(5, "Star Fall"), item(3, "Star Gate")];

        assert_eq!(numbers(&search_catalog(&catalog, "star")), vec![5, 3]);
    }

    #[test]
    fn test_unmatched_query_returns_empty() {
        let catalog = vec![item(1, "Drift")];

        assert!(search_catalog(&catalog, "zeppelin").is_empty());
    }

    #[test]
    fn test_search_copies_do_not_alias_the_snapshot() {
        let catalog = vec![item(1, "Drift")];

        let mut results = search_catalog(&catalog, "");
        results[0].name.push_str(" Redux");

        assert_eq!(catalog[0].name, "Drift");
    }
}

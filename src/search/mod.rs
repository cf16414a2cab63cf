//! Linear substring search over pages and menu entries.
//!
//! Scoring: page title 3, page subtitle 2, page description 1 (first match
//! wins), menu item name 2. Results sort descending by score with a stable
//! sort, so ties keep scan order: pages before menu items, menu depth-first.
//! Queries shorter than 2 characters return nothing. Debouncing is the
//! caller's concern; this matcher is synchronous and pure.

use crate::menu::MenuArena;
use crate::models::Page;

pub(crate) const MIN_QUERY_LEN: usize = 2;
pub(crate) const MAX_RESULTS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum MatchField {
    Title,
    Subtitle,
    Description,
    MenuName,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct RankedResult {
    pub page_id: i64,
    pub label: String,
    /// Ancestor category names for menu hits, root first. Display only —
    /// never affects the score.
    pub breadcrumb: Vec<String>,
    pub field: MatchField,
    pub score: u8,
}

/// The minimum-length rule, shared with the UI so the history dropdown and
/// the matcher agree on what counts as "no query yet". Counts characters,
/// not bytes.
pub(crate) fn is_query_too_short(query: &str) -> bool {
    query.trim().chars().count() < MIN_QUERY_LEN
}

pub(crate) fn search(query: &str, pages: &[Page], menu: &MenuArena) -> Vec<RankedResult> {
    if is_query_too_short(query) {
        return Vec::new();
    }
    let q = query.trim().to_lowercase();

    let mut results: Vec<RankedResult> = Vec::new();

    for page in pages {
        let hit = if page.title.to_lowercase().contains(&q) {
            Some((MatchField::Title, 3))
        } else if page
            .subtitle
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&q))
        {
            Some((MatchField::Subtitle, 2))
        } else if page
            .description
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(&q))
        {
            Some((MatchField::Description, 1))
        } else {
            None
        };

        if let Some((field, score)) = hit {
            results.push(RankedResult {
                page_id: page.id,
                label: page.title.clone(),
                breadcrumb: Vec::new(),
                field,
                score,
            });
        }
    }

    menu.walk_items(&mut |node, path| {
        // Only leaves with a resolvable linked page are navigable results.
        let Some(page_id) = node.page_id else { return };
        if !pages.iter().any(|p| p.id == page_id) {
            return;
        }
        if node.name.to_lowercase().contains(&q) {
            results.push(RankedResult {
                page_id,
                label: node.name.clone(),
                breadcrumb: path.to_vec(),
                field: MatchField::MenuName,
                score: 2,
            });
        }
    });

    // Stable: equal scores keep insertion order (pages first, then menu).
    results.sort_by(|a, b| b.score.cmp(&a.score));
    results.truncate(MAX_RESULTS);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::MenuArena;
    use crate::normalize::{normalize_menu, normalize_pages};
    use serde_json::json;

    fn pages() -> Vec<Page> {
        normalize_pages(
            json!([
                {"Id": 1, "Title": "Sales Report"},
                {"Id": 2, "Title": "Overview", "Subtitle": "sales overview"},
                {"Id": 3, "Title": "Ops", "Description": "daily sales numbers"}
            ])
            .as_array()
            .unwrap(),
        )
    }

    fn menu() -> MenuArena {
        MenuArena::build(&normalize_menu(
            json!([
                {"Id": "cat", "Name": "Commercial", "Kind": "category", "Children": [
                    {"Id": "m1", "Name": "Sales dashboard", "Kind": "item", "PageId": 1},
                    {"Id": "m2", "Name": "Broken link", "Kind": "item", "PageId": 99}
                ]}
            ])
            .as_array()
            .unwrap(),
        ))
    }

    #[test]
    fn test_short_query_suppressed() {
        assert!(search("s", &pages(), &menu()).is_empty());
        assert!(search("", &pages(), &menu()).is_empty());
        assert!(search("  s  ", &pages(), &menu()).is_empty());
    }

    #[test]
    fn test_query_length_counts_chars_not_bytes() {
        // "é" is two bytes but one character: still below the minimum.
        assert!(is_query_too_short("é"));
        assert!(!is_query_too_short("éé"));
        assert!(is_query_too_short("  é  "));
    }

    #[test]
    fn test_title_outranks_subtitle_and_description() {
        let results = search("sales", &pages(), &menu());
        assert_eq!(results[0].page_id, 1);
        assert_eq!(results[0].score, 3);
        assert_eq!(results[0].field, MatchField::Title);

        // Subtitle (2) and menu name (2) tie; page scanned first wins.
        assert_eq!(results[1].page_id, 2);
        assert_eq!(results[1].field, MatchField::Subtitle);
        assert_eq!(results[2].field, MatchField::MenuName);

        // Description match ranks last.
        assert_eq!(results.last().unwrap().page_id, 3);
        assert_eq!(results.last().unwrap().score, 1);
    }

    #[test]
    fn test_first_match_field_wins() {
        let pages = normalize_pages(
            json!([{"Id": 9, "Title": "Sales", "Subtitle": "also sales"}])
                .as_array()
                .unwrap(),
        );
        let results = search("sales", &pages, &MenuArena::default());
        assert_eq!(results.len(), 1);
        // Scored on title even though the subtitle matches too.
        assert_eq!(results[0].score, 3);
    }

    #[test]
    fn test_menu_hit_carries_breadcrumb() {
        let results = search("dashboard", &pages(), &menu());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].breadcrumb, vec!["Commercial".to_string()]);
        assert_eq!(results[0].score, 2);
    }

    #[test]
    fn test_unresolvable_menu_link_excluded() {
        // "Broken link" points at page 99 which does not exist.
        let results = search("broken", &pages(), &menu());
        assert!(results.is_empty());
    }

    #[test]
    fn test_case_insensitive() {
        let results = search("SALES", &pages(), &menu());
        assert!(!results.is_empty());
    }

    #[test]
    fn test_truncated_to_top_ten() {
        let many: Vec<_> = (0..15)
            .map(|i| json!({"Id": i, "Title": format!("Sales {i}")}))
            .collect();
        let pages = normalize_pages(&many);
        let results = search("sales", &pages, &MenuArena::default());
        assert_eq!(results.len(), MAX_RESULTS);
        // Stable sort: scan order preserved within the equal-score run.
        assert_eq!(results[0].page_id, 0);
        assert_eq!(results[9].page_id, 9);
    }
}

//! Boundary adapter from raw server records to canonical models.
//!
//! The SQL backend returns PascalCase column names, but records that were
//! round-tripped through the client (or newer endpoints) arrive in camelCase.
//! Resolution order per field: PascalCase key, else camelCase key, else a
//! type-appropriate default. Malformed input degrades to defaults — this
//! module never fails; the renderer must tolerate partially-populated
//! records.

use crate::models::{HighlightRegion, MenuNode, MenuNodeKind, Page, Tutorial, TutorialStep};
use serde_json::Value;

/// String field with PascalCase-first resolution. Missing or non-string
/// yields `None`.
fn get_str(item: &Value, pascal: &str, camel: &str) -> Option<String> {
    item.get(pascal)
        .or_else(|| item.get(camel))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

fn get_opt_str(item: &Value, pascal: &str, camel: &str) -> Option<String> {
    get_str(item, pascal, camel).filter(|s| !s.trim().is_empty())
}

/// Numeric field. SQL drivers differ on whether numbers survive as JSON
/// numbers or come back as strings, so both are accepted.
fn get_i64(item: &Value, pascal: &str, camel: &str) -> Option<i64> {
    let v = item.get(pascal).or_else(|| item.get(camel))?;
    v.as_i64()
        .or_else(|| v.as_f64().map(|f| f as i64))
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn get_f64(item: &Value, pascal: &str, camel: &str) -> Option<f64> {
    let v = item.get(pascal).or_else(|| item.get(camel))?;
    v.as_f64()
        .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
}

fn get_bool(item: &Value, pascal: &str, camel: &str) -> Option<bool> {
    let v = item.get(pascal).or_else(|| item.get(camel))?;
    v.as_bool()
        .or_else(|| v.as_i64().map(|n| n != 0))
        .or_else(|| v.as_str().map(|s| matches!(s, "true" | "True" | "1")))
}

pub(crate) fn normalize_page(item: &Value) -> Page {
    Page {
        id: get_i64(item, "Id", "id").unwrap_or(0),
        title: get_str(item, "Title", "title").unwrap_or_default(),
        subtitle: get_opt_str(item, "Subtitle", "subtitle"),
        description: get_opt_str(item, "Description", "description"),
        embed_url: get_opt_str(item, "EmbedUrl", "embedUrl"),
        // Pages are visible on Home unless explicitly hidden.
        show_in_home: get_bool(item, "ShowInHome", "showInHome").unwrap_or(true),
        icon: get_opt_str(item, "Icon", "icon"),
        sort_order: get_i64(item, "SortOrder", "sortOrder").unwrap_or(0),
    }
}

pub(crate) fn normalize_pages(items: &[Value]) -> Vec<Page> {
    items.iter().map(normalize_page).collect()
}

pub(crate) fn normalize_menu_node(item: &Value) -> MenuNode {
    let kind_raw = get_str(item, "Kind", "kind")
        .or_else(|| get_str(item, "Type", "type"))
        .unwrap_or_default();
    let kind = match kind_raw.to_lowercase().as_str() {
        "category" => MenuNodeKind::Category,
        _ => MenuNodeKind::Item,
    };

    let children = item
        .get("Children")
        .or_else(|| item.get("children"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(normalize_menu_node).collect())
        .unwrap_or_default();

    MenuNode {
        // Menu ids come back as numbers from SQL and as strings from the
        // client cache; keep them opaque strings either way.
        id: get_str(item, "Id", "id")
            .or_else(|| get_i64(item, "Id", "id").map(|n| n.to_string()))
            .unwrap_or_default(),
        name: get_str(item, "Name", "name").unwrap_or_default(),
        page_id: get_i64(item, "PageId", "pageId"),
        icon: get_opt_str(item, "Icon", "icon"),
        sort_order: get_i64(item, "SortOrder", "sortOrder").unwrap_or(0),
        // Items never own children, whatever the record claims.
        children: match kind {
            MenuNodeKind::Item => Vec::new(),
            MenuNodeKind::Category => children,
        },
        kind,
    }
}

pub(crate) fn normalize_menu(items: &[Value]) -> Vec<MenuNode> {
    items.iter().map(normalize_menu_node).collect()
}

fn normalize_step(item: &Value) -> TutorialStep {
    let region = |v: &Value| HighlightRegion {
        top: get_f64(v, "Top", "top").unwrap_or(0.0),
        left: get_f64(v, "Left", "left").unwrap_or(0.0),
        width: get_f64(v, "Width", "width").unwrap_or(0.0),
        height: get_f64(v, "Height", "height").unwrap_or(0.0),
    };

    // Highlight is either a nested object or flattened onto the step record.
    let highlight = item
        .get("Highlight")
        .or_else(|| item.get("highlight"))
        .map(&region)
        .unwrap_or_else(|| region(item));

    TutorialStep {
        title: get_str(item, "Title", "title").unwrap_or_default(),
        description: get_str(item, "Description", "description").unwrap_or_default(),
        highlight,
    }
}

pub(crate) fn normalize_tutorial(item: &Value) -> Tutorial {
    let steps = item
        .get("Steps")
        .or_else(|| item.get("steps"))
        .and_then(|v| v.as_array())
        .map(|arr| arr.iter().map(normalize_step).collect())
        .unwrap_or_default();

    Tutorial {
        page_id: get_i64(item, "PageId", "pageId").unwrap_or(0),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_default_substitution() {
        let p = normalize_page(&json!({"Id": 1, "Title": "X"}));
        assert_eq!(p.id, 1);
        assert_eq!(p.title, "X");
        assert!(p.show_in_home);
        assert_eq!(p.sort_order, 0);
        assert!(p.icon.is_none());
        assert!(p.embed_url.is_none());
    }

    #[test]
    fn test_page_show_in_home_explicit_false() {
        let p = normalize_page(&json!({"Id": 2, "Title": "Y", "ShowInHome": false}));
        assert!(!p.show_in_home);
        // Also accept SQL bit columns.
        let p = normalize_page(&json!({"Id": 2, "Title": "Y", "ShowInHome": 0}));
        assert!(!p.show_in_home);
    }

    #[test]
    fn test_page_numeric_string_order() {
        let p = normalize_page(&json!({"Id": "7", "Title": "Z", "SortOrder": "3"}));
        assert_eq!(p.id, 7);
        assert_eq!(p.sort_order, 3);
    }

    #[test]
    fn test_normalizer_idempotence() {
        let p = normalize_page(&json!({
            "Id": 5,
            "Title": "Sales",
            "Subtitle": "Quarterly",
            "EmbedUrl": "https://app.powerbi.com/view?r=abc",
            "ShowInHome": false,
            "SortOrder": 2
        }));
        // Serialize back out (camelCase) and run it through again.
        let reparsed = normalize_page(&serde_json::to_value(&p).unwrap());
        assert_eq!(p, reparsed);
    }

    #[test]
    fn test_menu_tree_round_trip_three_levels() {
        let raw = json!([{
            "Id": 10, "Name": "Finance", "Kind": "category", "SortOrder": 2,
            "Children": [
                {"Id": 11, "Name": "Reports", "Kind": "category", "SortOrder": 1,
                 "Children": [
                    {"Id": 12, "Name": "P&L", "Kind": "item", "PageId": 3, "SortOrder": 2},
                    {"Id": 13, "Name": "Cashflow", "Kind": "item", "PageId": 4, "SortOrder": 1}
                 ]}
            ]
        }]);
        let tree = normalize_menu(raw.as_array().unwrap());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].children.len(), 1);
        assert_eq!(tree[0].children[0].children.len(), 2);

        // Re-normalizing the serialized canonical form preserves the tree.
        let round = normalize_menu(
            serde_json::to_value(&tree).unwrap().as_array().unwrap(),
        );
        assert_eq!(tree, round);
    }

    #[test]
    fn test_menu_item_children_dropped() {
        // Items never carry children even when the record claims some.
        let node = normalize_menu_node(&json!({
            "Id": 1, "Name": "Leaf", "Kind": "item", "PageId": 9,
            "Children": [{"Id": 2, "Name": "Orphan", "Kind": "item"}]
        }));
        assert_eq!(node.kind, MenuNodeKind::Item);
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_menu_children_non_array_yields_empty() {
        let node = normalize_menu_node(&json!({
            "Id": 1, "Name": "Cat", "Kind": "category", "Children": "oops"
        }));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_camel_case_pass_through() {
        let p = normalize_page(&json!({"id": 4, "title": "Ops", "showInHome": false}));
        assert_eq!(p.id, 4);
        assert_eq!(p.title, "Ops");
        assert!(!p.show_in_home);
    }

    #[test]
    fn test_tutorial_flattened_and_nested_highlight() {
        let t = normalize_tutorial(&json!({
            "PageId": 3,
            "Steps": [
                {"Title": "A", "Highlight": {"Top": "10", "Left": 20, "Width": 30, "Height": 15}},
                {"Title": "B", "Top": 5, "Left": 5, "Width": 50, "Height": 40}
            ]
        }));
        assert_eq!(t.page_id, 3);
        assert_eq!(t.steps.len(), 2);
        assert_eq!(t.steps[0].highlight.top, 10.0);
        assert_eq!(t.steps[1].highlight.width, 50.0);
    }

    #[test]
    fn test_malformed_record_degrades_to_defaults() {
        let p = normalize_page(&json!({"Id": "not-a-number", "Title": 42}));
        assert_eq!(p.id, 0);
        assert_eq!(p.title, "");
        assert!(p.show_in_home);
    }
}

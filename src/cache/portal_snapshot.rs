//! Offline fallback snapshots for the menu tree and page collection.
//!
//! A snapshot is overwritten only after a *successful* fetch; a failed fetch
//! reads the most recent snapshot rather than clearing it, so the portal
//! degrades to stale navigation instead of an error screen.

use crate::models::{MenuNode, Page};
use crate::storage::{
    load_json_from_storage, save_json_to_storage, MENU_SNAPSHOT_KEY, PAGES_SNAPSHOT_KEY,
};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct MenuSnapshot {
    pub saved_ms: i64,
    pub nodes: Vec<MenuNode>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PagesSnapshot {
    pub saved_ms: i64,
    pub pages: Vec<Page>,
}

pub(crate) fn save_menu_snapshot(nodes: &[MenuNode], saved_ms: i64) {
    // Snapshot owns its own copy: later in-memory mutation of the live tree
    // cannot reach the persisted data.
    let snap = MenuSnapshot {
        saved_ms,
        nodes: nodes.to_vec(),
    };
    save_json_to_storage(MENU_SNAPSHOT_KEY, &snap);
}

/// Corrupt or absent persisted data silently yields `None`; boot never fails
/// on the cache.
pub(crate) fn load_menu_snapshot() -> Option<Vec<MenuNode>> {
    load_json_from_storage::<MenuSnapshot>(MENU_SNAPSHOT_KEY).map(|s| s.nodes)
}

pub(crate) fn save_pages_snapshot(pages: &[Page], saved_ms: i64) {
    let snap = PagesSnapshot {
        saved_ms,
        pages: pages.to_vec(),
    };
    save_json_to_storage(PAGES_SNAPSHOT_KEY, &snap);
}

pub(crate) fn load_pages_snapshot() -> Option<Vec<Page>> {
    load_json_from_storage::<PagesSnapshot>(PAGES_SNAPSHOT_KEY).map(|s| s.pages)
}

/// Fallback policy for one load cycle.
///
/// Returns the collection to use plus whether it came from a fresh fetch
/// (and should therefore overwrite the snapshot).
pub(crate) fn resolve_with_fallback<T, E>(
    fetched: Result<Vec<T>, E>,
    snapshot: Option<Vec<T>>,
) -> (Vec<T>, bool) {
    match fetched {
        Ok(items) => (items, true),
        Err(_) => (snapshot.unwrap_or_default(), false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Page;
    use serde_json::json;

    fn page(id: i64, title: &str) -> Page {
        crate::normalize::normalize_page(&json!({"Id": id, "Title": title}))
    }

    #[test]
    fn test_fallback_uses_snapshot_on_fetch_failure() {
        let snapshot = Some(vec![page(1, "A")]);
        let (pages, fresh) =
            resolve_with_fallback::<Page, String>(Err("network down".to_string()), snapshot);
        assert!(!fresh);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].id, 1);
        assert_eq!(pages[0].title, "A");
    }

    #[test]
    fn test_fallback_empty_without_snapshot() {
        let (pages, fresh) = resolve_with_fallback::<Page, String>(Err("boom".to_string()), None);
        assert!(!fresh);
        assert!(pages.is_empty());
    }

    #[test]
    fn test_fresh_fetch_wins_over_snapshot() {
        let snapshot = Some(vec![page(1, "stale")]);
        let (pages, fresh) =
            resolve_with_fallback::<Page, String>(Ok(vec![page(2, "fresh")]), snapshot);
        assert!(fresh);
        assert_eq!(pages[0].title, "fresh");
    }
}

use crate::models::{AccountInfo, RecentSearch, ThemeMode};
use crate::util::now_ms;
use serde::{Deserialize, Serialize};

pub(crate) const TOKEN_KEY: &str = "biportal_token";
pub(crate) const USER_KEY: &str = "biportal_user";
pub(crate) const THEME_KEY: &str = "biportal_theme";
pub(crate) const SIDEBAR_COLLAPSED_KEY: &str = "biportal_sidebar_collapsed";

// Offline fallback snapshots + local search history.
pub(crate) const MENU_SNAPSHOT_KEY: &str = "biportal_menu_snapshot";
pub(crate) const PAGES_SNAPSHOT_KEY: &str = "biportal_pages_snapshot";
pub(crate) const SEARCH_HISTORY_KEY: &str = "biportal_search_history";

pub(crate) fn save_user_to_storage(user: &AccountInfo) {
    if let Ok(json) = serde_json::to_string(user) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(USER_KEY, &json);
        }
    }
}

pub(crate) fn load_user_from_storage() -> Option<AccountInfo> {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        if let Ok(Some(json)) = storage.get_item(USER_KEY) {
            return serde_json::from_str(&json).ok();
        }
    }
    None
}

pub(crate) fn load_json_from_storage<T: for<'de> Deserialize<'de>>(key: &str) -> Option<T> {
    let storage = web_sys::window().and_then(|w| w.local_storage().ok().flatten())?;
    let json = storage.get_item(key).ok().flatten()?;
    serde_json::from_str(&json).ok()
}

pub(crate) fn save_json_to_storage<T: Serialize>(key: &str, value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(key, &json);
        }
    }
}

pub(crate) fn load_theme() -> ThemeMode {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        if let Ok(Some(v)) = storage.get_item(THEME_KEY) {
            if v == "dark" {
                return ThemeMode::Dark;
            }
        }
    }
    ThemeMode::Light
}

pub(crate) fn save_theme(theme: ThemeMode) {
    if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
        let _ = storage.set_item(THEME_KEY, &theme.to_string());
    }
}

/// De-duplicating most-recent-first insert with a hard size cap.
pub(crate) fn upsert_lru_by_key<T: Clone>(
    mut items: Vec<T>,
    item: T,
    same_key: impl Fn(&T, &T) -> bool,
    max: usize,
) -> Vec<T> {
    items.retain(|x| !same_key(x, &item));
    items.insert(0, item);
    if items.len() > max {
        items.truncate(max);
    }
    items
}

pub(crate) fn load_search_history() -> Vec<RecentSearch> {
    load_json_from_storage::<Vec<RecentSearch>>(SEARCH_HISTORY_KEY).unwrap_or_default()
}

/// Record the literal query string a user selected a result for.
/// Bounded at 10, de-duplicated, most-recent-first.
pub(crate) fn write_search_history(query: &str) {
    if query.trim().is_empty() {
        return;
    }

    let item = RecentSearch {
        query: query.to_string(),
        last_used_ms: now_ms(),
    };

    let next = upsert_lru_by_key(load_search_history(), item, |a, b| a.query == b.query, 10);
    save_json_to_storage(SEARCH_HISTORY_KEY, &next);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(q: &str) -> RecentSearch {
        RecentSearch {
            query: q.to_string(),
            last_used_ms: 0,
        }
    }

    #[test]
    fn test_lru_dedupes_and_moves_to_front() {
        let items = vec![entry("a"), entry("b"), entry("c")];
        let next = upsert_lru_by_key(items, entry("b"), |x, y| x.query == y.query, 10);
        let order: Vec<_> = next.iter().map(|e| e.query.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_lru_respects_cap() {
        let mut items = Vec::new();
        for i in 0..10 {
            items.push(entry(&format!("q{i}")));
        }
        let next = upsert_lru_by_key(items, entry("fresh"), |x, y| x.query == y.query, 10);
        assert_eq!(next.len(), 10);
        assert_eq!(next[0].query, "fresh");
        // Oldest entry fell off.
        assert!(!next.iter().any(|e| e.query == "q9"));
    }
}

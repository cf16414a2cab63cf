mod api;
mod app;
mod cache;
mod components;
mod menu;
mod models;
mod normalize;
mod pages;
mod search;
mod state;
mod storage;
mod tutorial;
mod util;

use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;

// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}

// WASM-only tests (run with `cargo test --target wasm32-unknown-unknown` + wasm-bindgen-test-runner)
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use crate::api::ApiClient;
    use crate::cache::{load_menu_snapshot, save_menu_snapshot};
    use crate::models::{AccountInfo, MenuNode, MenuNodeKind};
    use crate::storage::{
        load_search_history, load_user_from_storage, save_user_to_storage, write_search_history,
    };
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_api_client_storage_roundtrip_token() {
        ApiClient::clear_storage();

        let mut c = ApiClient::load_from_storage();
        assert!(!c.is_authenticated());

        c.set_token("t1".to_string());
        c.save_to_storage();

        let c2 = ApiClient::load_from_storage();
        assert_eq!(c2.get_auth_token().as_deref(), Some("t1"));

        ApiClient::clear_storage();
        let c3 = ApiClient::load_from_storage();
        assert!(!c3.is_authenticated());
    }

    #[wasm_bindgen_test]
    fn test_user_storage_roundtrip() {
        let user = AccountInfo {
            extra: serde_json::json!({"id": 1, "username": "u"}),
        };
        save_user_to_storage(&user);
        let loaded = load_user_from_storage().expect("should load user from localStorage");
        assert_eq!(loaded.extra["username"], "u");
    }

    #[wasm_bindgen_test]
    fn test_menu_snapshot_roundtrip() {
        let nodes = vec![MenuNode {
            id: "cat-1".to_string(),
            name: "Sales".to_string(),
            kind: MenuNodeKind::Category,
            icon: None,
            page_id: None,
            sort_order: 0,
            children: vec![MenuNode {
                id: "item-1".to_string(),
                name: "Quarterly".to_string(),
                kind: MenuNodeKind::Item,
                icon: None,
                page_id: Some(7),
                sort_order: 0,
                children: vec![],
            }],
        }];

        save_menu_snapshot(&nodes, 1_700_000_000_000);
        let loaded = load_menu_snapshot().expect("should load menu snapshot");
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].children[0].page_id, Some(7));
    }

    #[wasm_bindgen_test]
    fn test_search_history_persists_most_recent_first() {
        write_search_history("sales");
        write_search_history("finance");
        write_search_history("sales");

        let history = load_search_history();
        assert_eq!(history[0].query, "sales");
        assert_eq!(history[1].query, "finance");
    }
}

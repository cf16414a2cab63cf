use crate::api::{ApiClient, ApiErrorKind};
use crate::cache::{
    load_menu_snapshot, load_pages_snapshot, resolve_with_fallback, save_menu_snapshot,
    save_pages_snapshot,
};
use crate::menu::MenuArena;
use crate::models::{AccountInfo, MenuNode, Page, PortalConfig, Tutorial};
use crate::normalize::{normalize_menu, normalize_pages};
use crate::storage::{
    load_theme, load_user_from_storage, save_user_to_storage, SIDEBAR_COLLAPSED_KEY,
};
use crate::util::now_ms;
use leptos::prelude::*;
use leptos::task::spawn_local;

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,
    pub current_user: RwSignal<Option<AccountInfo>>,

    /// Loaded from backend (with localStorage snapshot fallback).
    pub pages: RwSignal<Vec<Page>>,
    pub menu: RwSignal<MenuArena>,
    /// Raw normalized menu tree, kept for snapshotting alongside the arena.
    pub menu_tree: RwSignal<Vec<MenuNode>>,

    pub data_loading: RwSignal<bool>,
    /// Dismissible notice when the last load fell back to cached data.
    pub data_notice: RwSignal<Option<String>>,
    /// Stale-response guard for load cycles (no abort wiring: a superseded
    /// in-flight fetch completes and its result is discarded).
    pub data_request_id: RwSignal<u64>,

    /// Page currently shown in the embed area; `None` on Home.
    pub current_page_id: RwSignal<Option<i64>>,

    /// Tutorial engine: `Idle` is `tutorial_step == None`.
    pub tutorial: RwSignal<Option<Tutorial>>,
    pub tutorial_step: RwSignal<Option<usize>>,
    pub tutorial_notice: RwSignal<Option<String>>,

    pub portal_config: RwSignal<PortalConfig>,
    /// False until the config fetch has completed (either way). Forms that
    /// edit the config must not seed themselves from the defaults.
    pub config_loaded: RwSignal<bool>,

    /// Global UI state.
    pub sidebar_collapsed: RwSignal<bool>,
    pub search_query: RwSignal<String>,
}

impl AppState {
    pub fn new() -> Self {
        let stored_client = ApiClient::load_from_storage();
        let stored_user = load_user_from_storage();

        let sidebar_collapsed = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .and_then(|s| s.get_item(SIDEBAR_COLLAPSED_KEY).ok().flatten())
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

        let config = PortalConfig {
            theme: load_theme(),
            ..Default::default()
        };

        Self {
            api_client: RwSignal::new(stored_client),
            current_user: RwSignal::new(stored_user),
            pages: RwSignal::new(vec![]),
            menu: RwSignal::new(MenuArena::default()),
            menu_tree: RwSignal::new(vec![]),
            data_loading: RwSignal::new(false),
            data_notice: RwSignal::new(None),
            data_request_id: RwSignal::new(0),
            current_page_id: RwSignal::new(None),
            tutorial: RwSignal::new(None),
            tutorial_step: RwSignal::new(None),
            tutorial_notice: RwSignal::new(None),
            portal_config: RwSignal::new(config),
            config_loaded: RwSignal::new(false),
            sidebar_collapsed: RwSignal::new(sidebar_collapsed),
            search_query: RwSignal::new(String::new()),
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);

/// One load cycle: pages then menu, two sequential independent fetches.
///
/// Each writes a disjoint part of the shared state, so their relative
/// completion order cannot affect correctness. A successful fetch overwrites
/// the matching snapshot; a failed one falls back to it (or to an empty
/// collection) and raises a dismissible notice — never a hard error.
pub(crate) fn load_portal_data(app_state: AppContext) {
    let req_id = app_state.0.data_request_id.get_untracked().saturating_add(1);
    app_state.0.data_request_id.set(req_id);

    app_state.0.data_loading.set(true);
    app_state.0.data_notice.set(None);

    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        let pages_result = api_client.get_pages().await;
        let menu_result = api_client.get_menu().await;

        // Ignore stale responses from a superseded load cycle.
        if app_state.0.data_request_id.get_untracked() != req_id {
            return;
        }

        let unauthorized = [&pages_result, &menu_result]
            .iter()
            .any(|r| matches!(r, Err(e) if e.kind == ApiErrorKind::Unauthorized));
        if unauthorized {
            let mut c = app_state.0.api_client.get_untracked();
            c.logout();
            app_state.0.api_client.set(c);
            app_state.0.current_user.set(None);
            app_state.0.data_loading.set(false);
            if let Some(win) = web_sys::window() {
                let _ = win.location().set_href("/login");
            }
            return;
        }

        let mut fell_back = false;

        let (pages, fresh) = resolve_with_fallback(
            pages_result.map(|raw| normalize_pages(&raw)),
            load_pages_snapshot(),
        );
        if fresh {
            save_pages_snapshot(&pages, now_ms());
        } else {
            fell_back = true;
        }
        app_state.0.pages.set(pages);

        let (menu_tree, fresh) = resolve_with_fallback(
            menu_result.map(|raw| normalize_menu(&raw)),
            load_menu_snapshot(),
        );
        if fresh {
            save_menu_snapshot(&menu_tree, now_ms());
        } else {
            fell_back = true;
        }
        app_state.0.menu.set(MenuArena::build(&menu_tree));
        app_state.0.menu_tree.set(menu_tree);

        if fell_back {
            app_state.0.data_notice.set(Some(
                "Could not reach the server; showing the last saved data.".to_string(),
            ));
        }

        app_state.0.data_loading.set(false);
    });
}

/// Revalidate the stored token and refresh the cached account record.
/// Only a 401 ends the session; transient failures keep the stored user.
pub(crate) fn verify_session(app_state: AppContext) {
    let api_client = app_state.0.api_client.get_untracked();
    if !api_client.is_authenticated() {
        return;
    }
    spawn_local(async move {
        match api_client.verify_token().await {
            Ok(user) => {
                save_user_to_storage(&user);
                app_state.0.current_user.set(Some(user));
            }
            Err(e) if e.kind == ApiErrorKind::Unauthorized => {
                let mut c = app_state.0.api_client.get_untracked();
                c.logout();
                app_state.0.api_client.set(c);
                app_state.0.current_user.set(None);
                if let Some(win) = web_sys::window() {
                    let _ = win.location().set_href("/login");
                }
            }
            Err(_) => {}
        }
    });
}

/// Fetch the portal config once authenticated. Failures keep the defaults —
/// theming is cosmetic and must never block the portal.
pub(crate) fn load_portal_config(app_state: AppContext) {
    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        if let Ok(mut config) = api_client.get_config().await {
            // The locally persisted theme choice wins over the server default.
            config.theme = load_theme();
            app_state.0.portal_config.set(config);
        }
        // On failure the defaults are as good as it gets; either way the
        // config is now settled and forms may seed from it.
        app_state.0.config_loaded.set(true);
    });
}

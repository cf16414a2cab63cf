//! Navigation tree: a flat arena of nodes addressed by id, plus the sidebar
//! renderer.
//!
//! The arena holds child-lists as id vectors and a separate parent lookup
//! table (non-owning back-references for breadcrumb/ancestor walks only).
//! It is rebuilt from scratch on every normalization pass; a visited guard
//! during the build drops repeated ids, so cycles cannot form.

use crate::models::{IconSpec, MenuNode, MenuNodeKind};
use crate::state::AppContext;
use leptos::prelude::*;
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ArenaNode {
    pub id: String,
    pub name: String,
    pub kind: MenuNodeKind,
    pub page_id: Option<i64>,
    pub icon: Option<String>,
    pub sort_order: i64,
    pub children: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct MenuArena {
    nodes: HashMap<String, ArenaNode>,
    roots: Vec<String>,
    parent: HashMap<String, String>,
}

impl MenuArena {
    pub fn build(tree: &[MenuNode]) -> Self {
        let mut arena = MenuArena::default();
        let mut seen: HashSet<String> = HashSet::new();

        let mut roots = arena.insert_level(tree, None, &mut seen);
        sort_sibling_ids(&mut roots, &arena.nodes);
        arena.roots = roots;
        arena
    }

    fn insert_level(
        &mut self,
        level: &[MenuNode],
        parent: Option<&str>,
        seen: &mut HashSet<String>,
    ) -> Vec<String> {
        let mut ids = Vec::with_capacity(level.len());

        for node in level {
            if node.id.trim().is_empty() || !seen.insert(node.id.clone()) {
                // Empty or repeated id: drop the subtree rather than risk a
                // cycle through the parent table.
                continue;
            }

            let mut children = self.insert_level(&node.children, Some(&node.id), seen);
            sort_sibling_ids(&mut children, &self.nodes);

            self.nodes.insert(
                node.id.clone(),
                ArenaNode {
                    id: node.id.clone(),
                    name: node.name.clone(),
                    kind: node.kind,
                    page_id: match node.kind {
                        MenuNodeKind::Item => node.page_id,
                        MenuNodeKind::Category => None,
                    },
                    icon: node.icon.clone(),
                    sort_order: node.sort_order,
                    children,
                },
            );

            if let Some(p) = parent {
                self.parent.insert(node.id.clone(), p.to_string());
            }
            ids.push(node.id.clone());
        }

        ids
    }

    pub fn get(&self, id: &str) -> Option<&ArenaNode> {
        self.nodes.get(id)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent.get(id).map(|s| s.as_str())
    }

    /// Ancestor ids of `id`, nearest parent first. Never includes `id`.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut cur = id;
        while let Some(p) = self.parent_of(cur) {
            // Parent table is acyclic by construction; the length guard is a
            // hard stop if that ever breaks.
            if out.len() > self.nodes.len() {
                break;
            }
            out.push(p.to_string());
            cur = p;
        }
        out
    }

    /// Display path for breadcrumbs: ancestor names, root first.
    pub fn breadcrumb(&self, id: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .ancestors(id)
            .iter()
            .filter_map(|a| self.get(a).map(|n| n.name.clone()))
            .collect();
        names.reverse();
        names
    }

    /// The item node linked to a page, if any (first match in tree order).
    pub fn node_for_page(&self, page_id: i64) -> Option<&ArenaNode> {
        let mut found = None;
        self.walk_items(&mut |node, _| {
            if found.is_none() && node.page_id == Some(page_id) {
                found = Some(node.id.clone());
            }
        });
        found.and_then(|id| self.nodes.get(&id))
    }

    /// Depth-first visit of leaf items. `path` is the breadcrumb of ancestor
    /// names, root first.
    pub fn walk_items(&self, f: &mut impl FnMut(&ArenaNode, &[String])) {
        fn rec(
            arena: &MenuArena,
            ids: &[String],
            path: &mut Vec<String>,
            f: &mut impl FnMut(&ArenaNode, &[String]),
        ) {
            for id in ids {
                let Some(node) = arena.get(id) else { continue };
                match node.kind {
                    MenuNodeKind::Item => f(node, path),
                    MenuNodeKind::Category => {
                        path.push(node.name.clone());
                        rec(arena, &node.children, path, f);
                        path.pop();
                    }
                }
            }
        }
        rec(self, &self.roots, &mut Vec::new(), f);
    }
}

/// Siblings sort ascending by sort_order; stable, so ties keep source order.
fn sort_sibling_ids(ids: &mut [String], nodes: &HashMap<String, ArenaNode>) {
    ids.sort_by_key(|id| nodes.get(id).map(|n| n.sort_order).unwrap_or(0));
}

/// Ancestor group ids that must be open so the node is visible — used when a
/// deep link lands on an item without the user clicking through the tree.
pub(crate) fn expand_to(arena: &MenuArena, node_id: &str) -> Vec<String> {
    arena.ancestors(node_id)
}

#[component]
fn MenuIcon(icon: Option<String>) -> impl IntoView {
    // The slot is always rendered, even without an icon, to keep rows aligned.
    match IconSpec::detect(icon.as_deref()) {
        // Verbatim admin-entered markup; see IconSpec docs for the trust caveat.
        IconSpec::Svg(svg) => view! {
            <span class="inline-flex size-4 shrink-0 items-center [&_svg]:size-4" inner_html=svg />
        }
        .into_any(),
        IconSpec::FontClass(class) => view! {
            <i class=format!("inline-flex size-4 shrink-0 items-center justify-center {class}") />
        }
        .into_any(),
        IconSpec::Text(text) => view! {
            <span class="inline-flex size-4 shrink-0 items-center justify-center text-sm leading-none">
                {text}
            </span>
        }
        .into_any(),
        IconSpec::None => view! { <span class="inline-block size-4 shrink-0" /> }.into_any(),
    }
}

#[component]
fn MenuTreeNode(
    node_id: String,
    depth: usize,
    arena: StoredValue<MenuArena>,
    expanded: RwSignal<HashSet<String>>,
    active_page_id: Signal<Option<i64>>,
) -> impl IntoView {
    let Some(node) = arena.with_value(|a| a.get(&node_id).cloned()) else {
        // Child list referenced an id the arena dropped. Render nothing.
        web_sys::console::warn_1(&format!("menu: missing node {node_id}").into());
        return ().into_any();
    };

    let indent = format!("padding-left: {}rem", 0.75 + depth as f64 * 0.75);

    match node.kind {
        MenuNodeKind::Item => {
            let page_id = node.page_id;
            let is_active = move || page_id.is_some() && active_page_id.get() == page_id;
            let href = page_id
                .map(|id| format!("/page/{id}"))
                .unwrap_or_else(|| "#".to_string());

            view! {
                <a
                    href=href
                    style=indent
                    class="flex items-center gap-2 rounded-md py-1.5 pr-2 text-sm transition-colors hover:bg-surface-hover"
                    class:bg-accent=is_active
                    class:text-accent-foreground=is_active
                    class:font-medium=is_active
                >
                    <MenuIcon icon=node.icon />
                    <span class="truncate">{node.name}</span>
                </a>
            }
            .into_any()
        }
        MenuNodeKind::Category => {
            let id_for_toggle = node.id.clone();
            let id_for_state = node.id.clone();
            let is_expanded = move || expanded.get().contains(&id_for_state);

            let on_toggle = move |_| {
                expanded.update(|set| {
                    if !set.remove(&id_for_toggle) {
                        set.insert(id_for_toggle.clone());
                    }
                });
            };

            let child_ids = node.children.clone();
            let empty_indent = format!("padding-left: {}rem", 0.75 + (depth + 1) as f64 * 0.75);

            let children_view = if child_ids.is_empty() {
                // Empty categories stay visible so an admin can see them and
                // navigate in; they get a placeholder row instead of vanishing.
                view! {
                    <div style=empty_indent class="py-1.5 pr-2 text-xs italic text-muted-foreground">
                        "(empty)"
                    </div>
                }
                .into_any()
            } else {
                let ids = StoredValue::new(child_ids);
                view! {
                    <For
                        each=move || ids.get_value()
                        key=|id| id.clone()
                        children=move |id| {
                            view! {
                                <MenuTreeNode
                                    node_id=id
                                    depth=depth + 1
                                    arena=arena
                                    expanded=expanded
                                    active_page_id=active_page_id
                                />
                            }
                        }
                    />
                }
                .into_any()
            };

            view! {
                <div>
                    <button
                        type="button"
                        style=indent
                        class="flex w-full items-center gap-2 rounded-md py-1.5 pr-2 text-left text-sm font-medium transition-colors hover:bg-surface-hover"
                        class:menu-group-expanded=is_expanded.clone()
                        on:click=on_toggle
                    >
                        <span
                            class="inline-flex shrink-0 transition-transform"
                            class:rotate-90={
                                let is_expanded = is_expanded.clone();
                                move || is_expanded()
                            }
                        >
                            <icons::ChevronRight class="size-3.5" />
                        </span>
                        <MenuIcon icon=node.icon />
                        <span class="truncate">{node.name}</span>
                    </button>
                    <div class="space-y-0.5" class:hidden=move || !is_expanded() >
                        {children_view}
                    </div>
                </div>
            }
            .into_any()
        }
    }
}

/// The portal navigation sidebar.
///
/// A synthetic Home entry always renders first, outside the persisted tree.
/// Expand/collapse state is ephemeral: it lives in a local signal and is not
/// persisted across sessions.
#[component]
pub fn SidebarMenu() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let arena_signal = app_state.0.menu;
    let active_page_id = Signal::derive(move || app_state.0.current_page_id.get());

    let expanded: RwSignal<HashSet<String>> = RwSignal::new(HashSet::new());

    // Deep links must land with the active leaf visible: walk its ancestor
    // groups open. Only ever adds to the expanded set — no other node's
    // state changes.
    Effect::new(move |_| {
        let Some(page_id) = active_page_id.get() else {
            return;
        };
        let arena = arena_signal.get();
        if let Some(node) = arena.node_for_page(page_id) {
            let ancestors = expand_to(&arena, &node.id);
            if !ancestors.is_empty() {
                expanded.update(|set| set.extend(ancestors));
            }
        }
    });

    let home_active = move || active_page_id.get().is_none();

    view! {
        <nav class="flex flex-col gap-0.5 px-2">
            <a
                href="/"
                class="flex items-center gap-2 rounded-md px-3 py-1.5 text-sm transition-colors hover:bg-surface-hover"
                class:bg-accent=home_active
                class:font-medium=home_active
            >
                {move || {
                    let cfg = app_state.0.portal_config.get();
                    view! { <MenuIcon icon=cfg.home_icon /> }
                }}
                <span>{move || app_state.0.portal_config.get().home_label}</span>
            </a>

            {move || {
                let arena = arena_signal.get();
                let roots = arena.roots().to_vec();
                let arena_sv = StoredValue::new(arena);
                roots
                    .into_iter()
                    .map(|id| {
                        view! {
                            <MenuTreeNode
                                node_id=id
                                depth=0
                                arena=arena_sv
                                expanded=expanded
                                active_page_id=active_page_id
                            />
                        }
                    })
                    .collect_view()
            }}
        </nav>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_menu;
    use serde_json::json;

    fn sample_arena() -> MenuArena {
        let raw = json!([
            {"Id": "b", "Name": "Finance", "Kind": "category", "SortOrder": 2, "Children": [
                {"Id": "b2", "Name": "Cashflow", "Kind": "item", "PageId": 4, "SortOrder": 2},
                {"Id": "b1", "Name": "P&L", "Kind": "item", "PageId": 3, "SortOrder": 1},
                {"Id": "b3", "Name": "Archive", "Kind": "category", "SortOrder": 3, "Children": []}
            ]},
            {"Id": "a", "Name": "Sales", "Kind": "item", "PageId": 1, "SortOrder": 1}
        ]);
        MenuArena::build(&normalize_menu(raw.as_array().unwrap()))
    }

    #[test]
    fn test_roots_sorted_by_sort_order() {
        let arena = sample_arena();
        assert_eq!(arena.roots(), &["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_children_sorted_and_parent_table() {
        let arena = sample_arena();
        let finance = arena.get("b").unwrap();
        assert_eq!(finance.children, vec!["b1", "b2", "b3"]);
        assert_eq!(arena.parent_of("b1"), Some("b"));
        assert_eq!(arena.parent_of("b"), None);
    }

    #[test]
    fn test_stable_tie_order() {
        let raw = json!([
            {"Id": "x", "Name": "X", "Kind": "item", "PageId": 1, "SortOrder": 0},
            {"Id": "y", "Name": "Y", "Kind": "item", "PageId": 2, "SortOrder": 0}
        ]);
        let arena = MenuArena::build(&normalize_menu(raw.as_array().unwrap()));
        // Equal sort_order keeps source order.
        assert_eq!(arena.roots(), &["x".to_string(), "y".to_string()]);
    }

    #[test]
    fn test_duplicate_id_dropped() {
        let raw = json!([
            {"Id": "a", "Name": "First", "Kind": "item", "PageId": 1},
            {"Id": "a", "Name": "Dup", "Kind": "item", "PageId": 2}
        ]);
        let arena = MenuArena::build(&normalize_menu(raw.as_array().unwrap()));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get("a").unwrap().name, "First");
    }

    #[test]
    fn test_ancestors_and_breadcrumb() {
        let arena = sample_arena();
        assert_eq!(arena.ancestors("b1"), vec!["b".to_string()]);
        assert_eq!(arena.breadcrumb("b1"), vec!["Finance".to_string()]);
        assert!(arena.ancestors("a").is_empty());
    }

    #[test]
    fn test_expand_to_selection() {
        let arena = sample_arena();
        let node = arena.node_for_page(3).unwrap();
        assert_eq!(node.id, "b1");
        assert_eq!(expand_to(&arena, &node.id), vec!["b".to_string()]);
    }

    #[test]
    fn test_walk_items_depth_first_with_paths() {
        let arena = sample_arena();
        let mut seen = Vec::new();
        arena.walk_items(&mut |node, path| {
            seen.push((node.name.clone(), path.to_vec()));
        });
        assert_eq!(
            seen,
            vec![
                ("Sales".to_string(), vec![]),
                ("P&L".to_string(), vec!["Finance".to_string()]),
                ("Cashflow".to_string(), vec!["Finance".to_string()]),
            ]
        );
    }

    #[test]
    fn test_category_never_carries_page_id() {
        let raw = json!([
            {"Id": "c", "Name": "Cat", "Kind": "category", "PageId": 7, "Children": []}
        ]);
        let arena = MenuArena::build(&normalize_menu(raw.as_array().unwrap()));
        assert!(arena.get("c").unwrap().page_id.is_none());
    }
}

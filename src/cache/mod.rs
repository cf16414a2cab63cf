pub(crate) mod portal_snapshot;

pub(crate) use portal_snapshot::{
    load_menu_snapshot, load_pages_snapshot, resolve_with_fallback, save_menu_snapshot,
    save_pages_snapshot,
};

use serde::{Deserialize, Serialize};

/// Backend account info object.
///
/// The auth endpoint returns this under the `user` field.
/// We keep it flexible to avoid breaking when backend fields evolve.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct AccountInfo {
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

/// Canonical page record. Only the `normalize` module constructs these from
/// raw server records; everything downstream sees this shape.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Page {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: Option<String>,

    /// Power BI embed URL. Absent renders a placeholder, not an error.
    #[serde(rename = "embedUrl", default)]
    pub embed_url: Option<String>,

    #[serde(rename = "showInHome", default = "default_true")]
    pub show_in_home: bool,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(rename = "sortOrder", default)]
    pub sort_order: i64,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum MenuNodeKind {
    Category,
    Item,
}

/// One entry in the navigation tree.
///
/// An `Item` never has children; linkage to a `Page` goes through `page_id`,
/// never an owning pointer. Parent back-references are derived by the `menu`
/// arena at build time, not stored here.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct MenuNode {
    pub id: String,
    pub name: String,
    pub kind: MenuNodeKind,

    #[serde(rename = "pageId", default)]
    pub page_id: Option<i64>,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(rename = "sortOrder", default)]
    pub sort_order: i64,

    #[serde(default)]
    pub children: Vec<MenuNode>,
}

/// Guided tutorial attached to exactly one page.
/// Zero steps means "unavailable" — the overlay engine refuses to start.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Tutorial {
    #[serde(rename = "pageId")]
    pub page_id: i64,
    #[serde(default)]
    pub steps: Vec<TutorialStep>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct TutorialStep {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub highlight: HighlightRegion,
}

/// Percentage rectangle relative to the embed iframe's rendered box.
///
/// Resolved against the iframe's *current* bounding box at render time only.
/// Never cache the resolved pixels: the iframe box changes with sidebar
/// collapse, window resize and theme-driven layout shifts.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub(crate) struct HighlightRegion {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Icon representation, detected by content inspection of the raw string
/// stored on pages and menu nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum IconSpec {
    /// Inline SVG markup, rendered verbatim.
    ///
    /// Trusted admin-entered configuration. This is a latent injection risk
    /// if config editing is ever opened to non-admins; detection is
    /// restricted to strings starting with `<svg` but the body is not
    /// sanitized.
    Svg(String),
    /// Recognized icon-font class name (e.g. `fas fa-chart-bar`).
    FontClass(String),
    /// Plain text or emoji.
    Text(String),
    /// No icon. The renderer still emits an empty slot to keep alignment.
    None,
}

impl IconSpec {
    pub fn detect(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return IconSpec::None;
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return IconSpec::None;
        }
        if trimmed.starts_with("<svg") {
            return IconSpec::Svg(trimmed.to_string());
        }

        // Icon-font classes: a run of class tokens where at least one carries
        // a known icon prefix, e.g. "fas fa-home" or "bi bi-house".
        let all_class_tokens = trimmed
            .split_whitespace()
            .all(|t| t.chars().all(|c| c.is_ascii_alphanumeric() || c == '-'));
        let has_icon_prefix = trimmed.split_whitespace().any(|t| {
            ["fa-", "bi-", "icon-"].iter().any(|p| t.starts_with(p))
                || matches!(t, "fas" | "far" | "fab" | "bi")
        });
        if all_class_tokens && has_icon_prefix {
            return IconSpec::FontClass(trimmed.to_string());
        }

        IconSpec::Text(trimmed.to_string())
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Portal-level configuration served by the backend config endpoint.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct PortalConfig {
    #[serde(rename = "portalName", default)]
    pub portal_name: String,
    #[serde(default)]
    pub theme: ThemeMode,
    #[serde(rename = "accentColor", default)]
    pub accent_color: Option<String>,
    #[serde(rename = "logoUrl", default)]
    pub logo_url: Option<String>,

    /// Name and icon of the synthetic Home entry in the sidebar.
    #[serde(rename = "homeLabel", default = "default_home_label")]
    pub home_label: String,
    #[serde(rename = "homeIcon", default)]
    pub home_icon: Option<String>,
}

fn default_home_label() -> String {
    "Home".to_string()
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            portal_name: "BI Portal".to_string(),
            theme: ThemeMode::Light,
            accent_color: None,
            logo_url: None,
            home_label: default_home_label(),
            home_icon: None,
        }
    }
}

/// One entry of the persisted search history (most-recent-first).
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct RecentSearch {
    pub query: String,
    pub last_used_ms: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_icon_detect_svg() {
        let spec = IconSpec::detect(Some("<svg viewBox=\"0 0 24 24\"><path d=\"M0 0\"/></svg>"));
        assert!(matches!(spec, IconSpec::Svg(_)));
    }

    #[test]
    fn test_icon_detect_font_class() {
        assert_eq!(
            IconSpec::detect(Some("fas fa-chart-bar")),
            IconSpec::FontClass("fas fa-chart-bar".to_string())
        );
        assert_eq!(
            IconSpec::detect(Some("bi-graph-up")),
            IconSpec::FontClass("bi-graph-up".to_string())
        );
    }

    #[test]
    fn test_icon_detect_text_and_emoji() {
        assert_eq!(IconSpec::detect(Some("📊")), IconSpec::Text("📊".to_string()));
        // A lone class-looking token without an icon prefix stays plain text.
        assert_eq!(
            IconSpec::detect(Some("report")),
            IconSpec::Text("report".to_string())
        );
    }

    #[test]
    fn test_icon_detect_none() {
        assert_eq!(IconSpec::detect(None), IconSpec::None);
        assert_eq!(IconSpec::detect(Some("   ")), IconSpec::None);
    }

    #[test]
    fn test_page_deserialize_defaults() {
        // Canonical camelCase shape with optional fields absent.
        let p: Page = serde_json::from_str(r#"{"id": 1, "title": "Sales"}"#).unwrap();
        assert!(p.show_in_home);
        assert_eq!(p.sort_order, 0);
        assert!(p.icon.is_none());
        assert!(p.embed_url.is_none());
    }
}

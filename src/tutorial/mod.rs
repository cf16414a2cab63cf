//! In-page guided tutorial overlay.
//!
//! State machine: `Idle -> Active(step) -> Idle`, held in
//! `AppState::tutorial_step`. The overlay DOM (backdrop, highlight frame,
//! tooltip) exists only while active — `ReportPage` mounts `TutorialOverlay`
//! behind a `<Show>`, so ending the tutorial destroys the elements instead of
//! hiding them.
//!
//! Geometry is recomputed from the embed iframe's *current* bounding box on
//! every step change and window resize; step percentages are never cached as
//! pixels.

use crate::api::ApiErrorKind;
use crate::models::{HighlightRegion, Tutorial};
use crate::state::AppContext;
use leptos::ev;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_dom::helpers::window_event_listener;

/// Vertical gap between highlight and tooltip, px.
const TOOLTIP_GAP: f64 = 12.0;
/// Minimum distance kept between the tooltip and the viewport edges, px.
const EDGE_MARGIN: f64 = 20.0;
/// Tooltip column width, px. Matches the rendered `w-[300px]`.
pub(crate) const TOOLTIP_WIDTH: f64 = 300.0;
/// Height estimate used until the tooltip element can be measured.
const TOOLTIP_FALLBACK_HEIGHT: f64 = 160.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// Resolve a step's percentage region against the iframe box, in viewport px.
pub(crate) fn highlight_rect(frame: Rect, region: &HighlightRegion) -> Rect {
    Rect {
        top: frame.top + frame.height * region.top / 100.0,
        left: frame.left + frame.width * region.left / 100.0,
        width: frame.width * region.width / 100.0,
        height: frame.height * region.height / 100.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
    /// True when the tooltip flipped above the highlight.
    pub above: bool,
}

/// Two-phase deterministic layout: center below the highlight, clamp
/// horizontally into the viewport, flip above when the bottom would
/// overflow. Not a constraint solver.
pub(crate) fn place_tooltip(
    highlight: Rect,
    tooltip_w: f64,
    tooltip_h: f64,
    viewport_w: f64,
    viewport_h: f64,
) -> TooltipPlacement {
    let mut left = highlight.left + highlight.width / 2.0 - tooltip_w / 2.0;
    if left < EDGE_MARGIN {
        left = EDGE_MARGIN;
    } else if left + tooltip_w > viewport_w - EDGE_MARGIN {
        left = viewport_w - EDGE_MARGIN - tooltip_w;
    }

    let below_top = highlight.bottom() + TOOLTIP_GAP;
    if below_top + tooltip_h > viewport_h {
        TooltipPlacement {
            left,
            top: highlight.top - TOOLTIP_GAP - tooltip_h,
            above: true,
        }
    } else {
        TooltipPlacement {
            left,
            top: below_top,
            above: false,
        }
    }
}

/// Enter the tutorial for a page. Fails quietly (user-facing notice, no
/// state change) when the page has no tutorial or the tutorial is empty.
pub(crate) fn start_tutorial(app_state: AppContext, page_id: i64) {
    let api_client = app_state.0.api_client.get_untracked();
    spawn_local(async move {
        match api_client.get_tutorial(page_id).await {
            Ok(Some(t)) if !t.steps.is_empty() => {
                app_state.0.tutorial.set(Some(t));
                app_state.0.tutorial_step.set(Some(0));
                app_state.0.tutorial_notice.set(None);
            }
            Ok(_) => {
                app_state
                    .0
                    .tutorial_notice
                    .set(Some("No tutorial is available for this page.".to_string()));
            }
            Err(e) if e.kind == ApiErrorKind::Unauthorized => {
                // Session expired mid-click; the page-level guard handles it.
                app_state.0.tutorial_notice.set(Some(e.to_string()));
            }
            Err(e) => {
                app_state
                    .0
                    .tutorial_notice
                    .set(Some(format!("Could not load the tutorial: {e}")));
            }
        }
    });
}

/// Bounds decision for a step jump, kept pure so the no-op contract is
/// testable off the DOM.
pub(crate) fn step_in_range(step_count: usize, i: usize) -> bool {
    i < step_count
}

/// True when a tutorial is running but belongs to a different page. A
/// tutorial is bound to exactly one page; the route can change under a
/// running tutorial (browser Back, sidebar click), and its percent regions
/// are meaningless against any other page's embed.
pub(crate) fn tutorial_strays_from(
    tutorial: Option<&Tutorial>,
    active_step: Option<usize>,
    page_id: i64,
) -> bool {
    active_step.is_some() && tutorial.is_some_and(|t| t.page_id != page_id)
}

/// Jump to step `i`. Out-of-range requests are logged and ignored.
pub(crate) fn show_step(app_state: &AppContext, i: usize) {
    let Some(tutorial) = app_state.0.tutorial.get_untracked() else {
        web_sys::console::warn_1(&"tutorial: show_step while idle".into());
        return;
    };
    if !step_in_range(tutorial.steps.len(), i) {
        web_sys::console::warn_1(
            &format!("tutorial: step {i} out of range (len {})", tutorial.steps.len()).into(),
        );
        return;
    }
    app_state.0.tutorial_step.set(Some(i));
}

pub(crate) fn next_step(app_state: &AppContext) {
    if let Some(i) = app_state.0.tutorial_step.get_untracked() {
        show_step(app_state, i + 1);
    }
}

pub(crate) fn previous_step(app_state: &AppContext) {
    match app_state.0.tutorial_step.get_untracked() {
        Some(i) if i > 0 => show_step(app_state, i - 1),
        _ => {}
    }
}

/// Exit the tutorial. Idempotent: calling on an idle engine is a no-op.
pub(crate) fn end_tutorial(app_state: &AppContext) {
    app_state.0.tutorial_step.set(None);
    app_state.0.tutorial.set(None);
}

/// The embed iframe handle `ReportPage` shares with the overlay. The overlay
/// only ever reads the outer bounding box; the report content is opaque.
#[derive(Clone, Copy)]
pub(crate) struct EmbedFrame(pub NodeRef<html::Iframe>);

fn frame_rect(frame: &EmbedFrame) -> Option<Rect> {
    let el = frame.0.get_untracked()?;
    let r = el.get_bounding_client_rect();
    Some(Rect {
        top: r.top(),
        left: r.left(),
        width: r.width(),
        height: r.height(),
    })
}

fn viewport_size() -> (f64, f64) {
    let Some(win) = web_sys::window() else {
        return (0.0, 0.0);
    };
    let w = win
        .inner_width()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    let h = win
        .inner_height()
        .ok()
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    (w, h)
}

fn px(v: f64) -> String {
    format!("{}px", v.round())
}

/// Backdrop + highlight frame + tooltip for the active tutorial step.
///
/// Mount only while the engine is active; the resize subscription lives and
/// dies with the component.
#[component]
pub fn TutorialOverlay() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let frame = expect_context::<EmbedFrame>();

    let tooltip_ref: NodeRef<html::Div> = NodeRef::new();

    // Bumped on window resize (and after mount) to force geometry reads.
    let layout_tick: RwSignal<u64> = RwSignal::new(0);

    // Scoped subscription: registered while the overlay is mounted, removed
    // with the component's owner on unmount. While active, a resize
    // recomputes geometry for the current step only; it never advances or
    // resets tutorial state.
    let _resize_handle = window_event_listener(ev::resize, move |_| {
        layout_tick.update(|t| *t = t.wrapping_add(1));
    });

    // Tooltip is measured after first paint; re-measure per step.
    Effect::new(move |_| {
        app_state.0.tutorial_step.track();
        layout_tick.update(|t| *t = t.wrapping_add(1));
    });

    let current_step = move || {
        let i = app_state.0.tutorial_step.get()?;
        app_state.0.tutorial.get().and_then(|t| t.steps.get(i).cloned())
    };

    let step_count = move || {
        app_state
            .0
            .tutorial
            .get()
            .map(|t| t.steps.len())
            .unwrap_or(0)
    };
    let step_index = move || app_state.0.tutorial_step.get().unwrap_or(0);
    let is_last = move || step_index() + 1 >= step_count();
    let is_first = move || step_index() == 0;

    // Geometry for the current step against the iframe's current box.
    let geometry = move || {
        layout_tick.get();
        let step = current_step()?;
        let fr = frame_rect(&frame)?;
        let hl = highlight_rect(fr, &step.highlight);

        let tooltip_h = tooltip_ref
            .get()
            .map(|el| el.get_bounding_client_rect().height())
            .filter(|h| *h > 0.0)
            .unwrap_or(TOOLTIP_FALLBACK_HEIGHT);

        let (vw, vh) = viewport_size();
        Some((hl, place_tooltip(hl, TOOLTIP_WIDTH, tooltip_h, vw, vh)))
    };

    let highlight_style = move || {
        let Some((hl, _)) = geometry() else {
            return "display: none".to_string();
        };
        format!(
            "top: {}; left: {}; width: {}; height: {}",
            px(hl.top),
            px(hl.left),
            px(hl.width),
            px(hl.height)
        )
    };

    let tooltip_style = move || {
        let Some((_, tp)) = geometry() else {
            return "display: none".to_string();
        };
        format!("top: {}; left: {}", px(tp.top), px(tp.left))
    };

    let on_back = move |_| previous_step(&app_state);
    let on_next = move |_| {
        if is_last() {
            end_tutorial(&app_state);
        } else {
            next_step(&app_state);
        }
    };
    let on_exit = move |_| end_tutorial(&app_state);

    view! {
        <div class="fixed inset-0 z-40 bg-black/60" on:click=on_exit />

        <div
            class="pointer-events-none fixed z-50 rounded-sm border-2 border-primary shadow-[0_0_0_4px_rgba(255,255,255,0.25)]"
            style=highlight_style
        />

        <div
            node_ref=tooltip_ref
            class="fixed z-50 w-[300px] rounded-lg border bg-card p-4 text-card-foreground shadow-lg"
            style=tooltip_style
        >
            <div class="mb-1 flex items-start justify-between gap-2">
                <h3 class="text-sm font-semibold leading-tight">
                    {move || current_step().map(|s| s.title).unwrap_or_default()}
                </h3>
                <button
                    type="button"
                    class="text-muted-foreground hover:text-foreground"
                    aria-label="Exit tutorial"
                    on:click=on_exit
                >
                    <icons::X class="size-4" />
                </button>
            </div>

            <p class="mb-3 text-xs text-muted-foreground">
                {move || current_step().map(|s| s.description).unwrap_or_default()}
            </p>

            <div class="flex items-center justify-between">
                <span class="text-xs text-muted-foreground">
                    {move || format!("{} / {}", step_index() + 1, step_count())}
                </span>
                <div class="flex items-center gap-2">
                    <Show when=move || !is_first() fallback=|| ().into_view()>
                        <button
                            type="button"
                            class="rounded-md border px-2.5 py-1 text-xs hover:bg-accent"
                            on:click=on_back
                        >
                            "Back"
                        </button>
                    </Show>
                    <button
                        type="button"
                        class="rounded-md bg-primary px-2.5 py-1 text-xs text-primary-foreground hover:bg-primary/90"
                        on:click=on_next
                    >
                        {move || if is_last() { "Finish" } else { "Next" }}
                    </button>
                </div>
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize_tutorial;
    use serde_json::json;

    fn three_step_tutorial(page_id: i64) -> Tutorial {
        normalize_tutorial(&json!({
            "PageId": page_id,
            "Steps": [
                {"Title": "A", "Top": 0, "Left": 0, "Width": 10, "Height": 10},
                {"Title": "B", "Top": 10, "Left": 0, "Width": 10, "Height": 10},
                {"Title": "C", "Top": 20, "Left": 0, "Width": 10, "Height": 10}
            ]
        }))
    }

    #[test]
    fn test_out_of_range_step_is_rejected() {
        let t = three_step_tutorial(1);
        // Step 5 of a 3-step tutorial must be a no-op.
        assert!(!step_in_range(t.steps.len(), 5));
        assert!(!step_in_range(t.steps.len(), 3));
        assert!(step_in_range(t.steps.len(), 0));
        assert!(step_in_range(t.steps.len(), 2));
        assert!(!step_in_range(0, 0));
    }

    #[test]
    fn test_active_tutorial_ends_when_route_leaves_its_page() {
        let t = three_step_tutorial(1);
        // Running on page 1, route now shows page 2: must end.
        assert!(tutorial_strays_from(Some(&t), Some(0), 2));
        // Still on its own page: keeps running.
        assert!(!tutorial_strays_from(Some(&t), Some(1), 1));
        // Idle engine never strays, whatever page is shown.
        assert!(!tutorial_strays_from(Some(&t), None, 2));
        assert!(!tutorial_strays_from(None, None, 2));
    }

    fn region(top: f64, left: f64, width: f64, height: f64) -> HighlightRegion {
        HighlightRegion {
            top,
            left,
            width,
            height,
        }
    }

    #[test]
    fn test_highlight_geometry_from_iframe_box() {
        let frame = Rect {
            top: 100.0,
            left: 50.0,
            width: 800.0,
            height: 600.0,
        };
        let hl = highlight_rect(frame, &region(10.0, 20.0, 30.0, 15.0));
        assert_eq!(hl.top, 160.0);
        assert_eq!(hl.left, 210.0);
        assert_eq!(hl.width, 240.0);
        assert_eq!(hl.height, 90.0);
    }

    #[test]
    fn test_highlight_tracks_moved_frame() {
        // Same region, different iframe box (sidebar collapsed): pixels move.
        let wide = Rect {
            top: 100.0,
            left: 0.0,
            width: 1000.0,
            height: 600.0,
        };
        let hl = highlight_rect(wide, &region(10.0, 20.0, 30.0, 15.0));
        assert_eq!(hl.left, 200.0);
        assert_eq!(hl.width, 300.0);
    }

    #[test]
    fn test_tooltip_centered_below() {
        let hl = Rect {
            top: 200.0,
            left: 300.0,
            width: 200.0,
            height: 100.0,
        };
        let tp = place_tooltip(hl, 300.0, 150.0, 1280.0, 900.0);
        assert!(!tp.above);
        // Centered under the highlight midpoint (400), offset by the gap.
        assert_eq!(tp.left, 250.0);
        assert_eq!(tp.top, 312.0);
    }

    #[test]
    fn test_tooltip_clamps_left_edge() {
        let hl = Rect {
            top: 200.0,
            left: 0.0,
            width: 100.0,
            height: 100.0,
        };
        // Midpoint 50 - 150 = computed left -100: clamp to the margin.
        let tp = place_tooltip(hl, 300.0, 150.0, 1280.0, 900.0);
        assert_eq!(tp.left, 20.0);
    }

    #[test]
    fn test_tooltip_clamps_right_edge() {
        let hl = Rect {
            top: 200.0,
            left: 1200.0,
            width: 80.0,
            height: 100.0,
        };
        let tp = place_tooltip(hl, 300.0, 150.0, 1280.0, 900.0);
        assert_eq!(tp.left, 1280.0 - 20.0 - 300.0);
    }

    #[test]
    fn test_tooltip_flips_above_on_bottom_overflow() {
        let hl = Rect {
            top: 700.0,
            left: 300.0,
            width: 200.0,
            height: 150.0,
        };
        // Below would land at 862 + 150 > 900.
        let tp = place_tooltip(hl, 300.0, 150.0, 1280.0, 900.0);
        assert!(tp.above);
        assert_eq!(tp.top, 700.0 - 12.0 - 150.0);
    }
}

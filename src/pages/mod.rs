use crate::components::ui::{
    Alert, AlertDescription, Button, ButtonSize, ButtonVariant, Card, CardContent,
    CardDescription, CardHeader, CardTitle, Input, Label, Spinner,
};
use crate::menu::SidebarMenu;
use crate::models::{IconSpec, Page, PortalConfig, ThemeMode};
use crate::search::{is_query_too_short, search, RankedResult};
use crate::state::{load_portal_config, load_portal_data, verify_session, AppContext};
use crate::storage::{
    load_search_history, save_theme, save_user_to_storage, write_search_history,
    SIDEBAR_COLLAPSED_KEY,
};
use crate::tutorial::{
    end_tutorial, start_tutorial, tutorial_strays_from, EmbedFrame, TutorialOverlay,
};
use crate::util::{clear_timeout, set_timeout};
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_router::hooks::{use_navigate, use_params};
use leptos_router::params::Params;

#[component]
pub fn LoginPage() -> impl IntoView {
    let username: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let username_val = username.get();
        let password_val = password.get();

        // User input errors abort before any network call.
        if username_val.trim().is_empty() || password_val.is_empty() {
            error.set(Some("Username and password are required".to_string()));
            return;
        }

        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&username_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.user);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.user));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-md flex-col justify-center px-4 py-12">
                <div class="mb-6">
                    <span class="text-sm font-medium text-foreground">
                        {move || app_state.0.portal_config.get().portal_name}
                    </span>
                    <div class="text-xs text-muted-foreground">"Administrative portal"</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-xl">"Sign in"</CardTitle>
                        <CardDescription>
                            "Use your portal account to continue."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-4" on:submit=on_submit>
                            <div class="flex flex-col gap-2">
                                <Label html_for="username">"Username"</Label>
                                <Input
                                    id="username"
                                    r#type="text"
                                    placeholder="admin"
                                    bind_value=username
                                />
                            </div>

                            <div class="flex flex-col gap-2">
                                <Label html_for="password">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button class="w-full" attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
fn SearchBox() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let navigate = StoredValue::new(use_navigate());

    let input_value: RwSignal<String> = RwSignal::new(String::new());
    let focused: RwSignal<bool> = RwSignal::new(false);
    let debounce_timer_id: RwSignal<Option<i32>> = RwSignal::new(None);

    // 300ms idle debounce before the (synchronous) matcher runs.
    Effect::new(move |_| {
        let raw = input_value.get();

        if let Some(tid) = debounce_timer_id.get_untracked() {
            clear_timeout(tid);
        }

        let tid = set_timeout(
            move || {
                app_state.0.search_query.set(raw);
                debounce_timer_id.set(None);
            },
            300,
        );
        debounce_timer_id.set(tid);
    });

    let results = move || {
        let q = app_state.0.search_query.get();
        let pages = app_state.0.pages.get();
        let arena = app_state.0.menu.get();
        search(&q, &pages, &arena)
    };

    let show_history =
        move || focused.get() && is_query_too_short(&app_state.0.search_query.get());

    let on_pick = move |r: RankedResult| {
        // Persist the literal query the user selected a result for.
        write_search_history(&app_state.0.search_query.get_untracked());
        input_value.set(String::new());
        app_state.0.search_query.set(String::new());
        focused.set(false);
        navigate.with_value(|nav| nav(&format!("/page/{}", r.page_id), Default::default()));
    };

    view! {
        <div class="relative px-2">
            <Input
                r#type="search"
                placeholder="Search pages..."
                bind_value=input_value
                class="h-8 text-sm"
                on:focus=move |_| focused.set(true)
            />

            <Show
                when=move || focused.get() && (!results().is_empty() || show_history())
                fallback=|| ().into_view()
            >
                <div class="absolute left-2 right-2 top-10 z-30 rounded-md border bg-card p-1 shadow-md">
                    <Show when=show_history fallback=|| ().into_view()>
                        <div class="px-2 py-1 text-xs font-medium text-muted-foreground">
                            "Recent searches"
                        </div>
                        {move || {
                            load_search_history()
                                .into_iter()
                                .map(|h| {
                                    let q = h.query.clone();
                                    view! {
                                        <button
                                            type="button"
                                            class="block w-full truncate rounded px-2 py-1 text-left text-sm hover:bg-surface-hover"
                                            on:click=move |_| input_value.set(q.clone())
                                        >
                                            {h.query}
                                        </button>
                                    }
                                })
                                .collect_view()
                        }}
                    </Show>

                    {move || {
                        results()
                            .into_iter()
                            .map(|r| {
                                let crumb = if r.breadcrumb.is_empty() {
                                    None
                                } else {
                                    Some(r.breadcrumb.join(" / "))
                                };
                                let pick = r.clone();
                                view! {
                                    <button
                                        type="button"
                                        class="block w-full rounded px-2 py-1 text-left hover:bg-surface-hover"
                                        on:click=move |_| on_pick(pick.clone())
                                    >
                                        <div class="truncate text-sm">{r.label.clone()}</div>
                                        {crumb.map(|c| view! {
                                            <div class="truncate text-xs text-muted-foreground">{c}</div>
                                        })}
                                    </button>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}

/// Inline style overriding the primary color token with the configured
/// accent. Empty when no accent is set, so the stylesheet default applies.
fn accent_style_for(cfg: &PortalConfig) -> String {
    cfg.accent_color
        .as_deref()
        .map(|c| format!("--primary: {c}"))
        .unwrap_or_default()
}

#[component]
pub fn AppLayout(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let sidebar_collapsed = app_state.0.sidebar_collapsed;
    let data_notice = app_state.0.data_notice;
    let tutorial_notice = app_state.0.tutorial_notice;

    // One load cycle per mount. The request-id guard in `load_portal_data`
    // makes a stray re-run harmless.
    let loaded_once: RwSignal<bool> = RwSignal::new(false);
    Effect::new(move |_| {
        if loaded_once.get_untracked() {
            return;
        }
        loaded_once.set(true);
        verify_session(app_state);
        load_portal_data(app_state);
        load_portal_config(app_state);
    });

    let persist_sidebar = move || {
        if let Some(storage) = web_sys::window().and_then(|w| w.local_storage().ok().flatten()) {
            let _ = storage.set_item(
                SIDEBAR_COLLAPSED_KEY,
                if sidebar_collapsed.get() { "1" } else { "0" },
            );
        }
    };

    let on_toggle_sidebar = move |_| {
        sidebar_collapsed.update(|c| *c = !*c);
        persist_sidebar();
    };

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    let is_dark = move || app_state.0.portal_config.get().theme == ThemeMode::Dark;

    let sidebar_width_class = move || {
        if sidebar_collapsed.get() {
            "w-0 overflow-hidden"
        } else {
            "w-64"
        }
    };

    let accent_style = move || accent_style_for(&app_state.0.portal_config.get());

    view! {
        <div
            class="min-h-screen bg-background text-foreground"
            class:dark=is_dark
            style=accent_style
        >
            <div class="flex min-h-screen">
                <aside class=move || {
                    format!(
                        "flex shrink-0 flex-col gap-3 border-r border-border bg-muted/30 py-3 transition-all {}",
                        sidebar_width_class()
                    )
                }>
                    <div class="flex items-center gap-2 px-4">
                        {move || app_state.0.portal_config.get().logo_url.map(|u| view! {
                            <img src=u alt="" class="size-5 shrink-0 rounded" />
                        })}
                        <span class="truncate text-sm font-semibold">
                            {move || app_state.0.portal_config.get().portal_name}
                        </span>
                    </div>
                    <SearchBox />
                    <div class="flex-1 overflow-y-auto">
                        <SidebarMenu />
                    </div>
                </aside>

                <div class="flex min-w-0 flex-1 flex-col">
                    <header class="flex h-12 items-center justify-between border-b border-border px-4">
                        <Button
                            variant=ButtonVariant::Ghost
                            size=ButtonSize::Icon
                            on:click=on_toggle_sidebar
                            attr:aria-label="Toggle sidebar"
                        >
                            <span
                                class="inline-flex transition-transform"
                                class:rotate-180=move || !sidebar_collapsed.get()
                            >
                                <icons::ChevronRight class="size-4" />
                            </span>
                        </Button>

                        <div class="flex items-center gap-2">
                            <Show when=move || app_state.0.data_loading.get() fallback=|| ().into_view()>
                                <Spinner />
                            </Show>
                            <a
                                href="/settings"
                                class="rounded-md px-2 py-1 text-sm text-muted-foreground hover:bg-accent hover:text-foreground"
                            >
                                "Settings"
                            </a>
                            <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_logout>
                                "Sign out"
                            </Button>
                        </div>
                    </header>

                    <main class="min-h-0 flex-1 p-4">
                        <Show when=move || data_notice.get().is_some() fallback=|| ().into_view()>
                            {move || data_notice.get().map(|n| view! {
                                <Alert class="mb-3 flex items-center justify-between">
                                    <AlertDescription>{n}</AlertDescription>
                                    <button
                                        type="button"
                                        class="text-muted-foreground hover:text-foreground"
                                        aria-label="Dismiss"
                                        on:click=move |_| data_notice.set(None)
                                    >
                                        <icons::X class="size-4" />
                                    </button>
                                </Alert>
                            })}
                        </Show>

                        <Show when=move || tutorial_notice.get().is_some() fallback=|| ().into_view()>
                            {move || tutorial_notice.get().map(|n| view! {
                                <Alert class="mb-3 flex items-center justify-between">
                                    <AlertDescription>{n}</AlertDescription>
                                    <button
                                        type="button"
                                        class="text-muted-foreground hover:text-foreground"
                                        aria-label="Dismiss"
                                        on:click=move |_| tutorial_notice.set(None)
                                    >
                                        <icons::X class="size-4" />
                                    </button>
                                </Alert>
                            })}
                        </Show>

                        {children()}
                    </main>
                </div>
            </div>
        </div>
    }
}

#[component]
fn PageIcon(icon: Option<String>) -> impl IntoView {
    match IconSpec::detect(icon.as_deref()) {
        IconSpec::Svg(svg) => view! {
            <span class="inline-flex size-6 items-center [&_svg]:size-6" inner_html=svg />
        }
        .into_any(),
        IconSpec::FontClass(class) => {
            view! { <i class=format!("inline-flex size-6 items-center justify-center text-lg {class}") /> }
                .into_any()
        }
        IconSpec::Text(text) => {
            view! { <span class="text-lg leading-none">{text}</span> }.into_any()
        }
        IconSpec::None => view! { <span class="inline-block size-6" /> }.into_any(),
    }
}

#[component]
pub fn HomePage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Home shows no embedded report; the sidebar Home entry is active.
    Effect::new(move |_| {
        app_state.0.current_page_id.set(None);
    });

    let home_pages = move || {
        let mut pages: Vec<Page> = app_state
            .0
            .pages
            .get()
            .into_iter()
            .filter(|p| p.show_in_home)
            .collect();
        pages.sort_by_key(|p| p.sort_order);
        pages
    };

    view! {
        <div class="space-y-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">
                    {move || app_state.0.portal_config.get().portal_name}
                </h1>
                <p class="text-xs text-muted-foreground">"Reports"</p>
            </div>

            <Show
                when=move || !home_pages().is_empty()
                fallback=move || view! {
                    <div class="rounded-md border border-border bg-muted p-4 text-sm text-muted-foreground">
                        {move || if app_state.0.data_loading.get() {
                            "Loading pages..."
                        } else {
                            "No pages yet."
                        }}
                    </div>
                }
            >
                <div class="grid grid-cols-1 gap-3 sm:grid-cols-2 lg:grid-cols-3">
                    {move || {
                        home_pages()
                            .into_iter()
                            .map(|p| {
                                let href = format!("/page/{}", p.id);
                                view! {
                                    <a
                                        href=href
                                        class="flex flex-col gap-1 rounded-xl border bg-card px-4 py-3 shadow-sm transition-colors hover:bg-surface-hover"
                                    >
                                        <div class="flex items-center gap-2">
                                            <PageIcon icon=p.icon.clone() />
                                            <div class="truncate text-sm font-medium">{p.title.clone()}</div>
                                        </div>
                                        {p.subtitle.clone().map(|s| view! {
                                            <div class="truncate text-xs text-muted-foreground">{s}</div>
                                        })}
                                    </a>
                                }
                            })
                            .collect_view()
                    }}
                </div>
            </Show>
        </div>
    }
}

#[derive(Params, PartialEq, Clone, Debug)]
pub struct PageRouteParams {
    pub page_id: Option<i64>,
}

#[component]
pub fn ReportPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let params = use_params::<PageRouteParams>();

    // Use a closure so params access happens inside a reactive tracking context.
    let page_id = move || params.get().ok().and_then(|p| p.page_id).unwrap_or(0);

    let frame_ref: NodeRef<html::Iframe> = NodeRef::new();
    provide_context(EmbedFrame(frame_ref));

    // Drives sidebar highlighting and ancestor auto-expand for deep links.
    Effect::new(move |_| {
        app_state.0.current_page_id.set(Some(page_id()));
    });

    // A tutorial is bound to exactly one page. The route can change without
    // remounting this component (browser Back, sidebar click between pages),
    // so a running tutorial for another page must be ended here, and leaving
    // the report view entirely ends it too.
    Effect::new(move |_| {
        let id = page_id();
        if tutorial_strays_from(
            app_state.0.tutorial.get_untracked().as_ref(),
            app_state.0.tutorial_step.get_untracked(),
            id,
        ) {
            end_tutorial(&app_state);
        }
    });
    on_cleanup(move || end_tutorial(&app_state));

    let page = move || {
        let id = page_id();
        app_state.0.pages.get().into_iter().find(|p| p.id == id)
    };

    let breadcrumb = move || {
        let arena = app_state.0.menu.get();
        arena
            .node_for_page(page_id())
            .map(|n| arena.breadcrumb(&n.id))
            .filter(|b| !b.is_empty())
            .map(|b| b.join(" / "))
    };

    let tutorial_active = move || app_state.0.tutorial_step.get().is_some();

    let on_start_tutorial = move |_| {
        start_tutorial(app_state, page_id());
    };

    view! {
        <div class="flex h-full flex-col gap-3">
            <Show
                when=move || page().is_some()
                fallback=move || view! {
                    <div class="rounded-md border border-border bg-muted p-4 text-sm text-muted-foreground">
                        {move || if app_state.0.data_loading.get() {
                            "Loading page..."
                        } else {
                            "This page does not exist."
                        }}
                    </div>
                }
            >
                <div class="flex items-start justify-between gap-2">
                    <div class="space-y-0.5">
                        {move || breadcrumb().map(|b| view! {
                            <p class="text-xs text-muted-foreground">{b}</p>
                        })}
                        <h1 class="text-lg font-semibold">
                            {move || page().map(|p| p.title).unwrap_or_default()}
                        </h1>
                        {move || page().and_then(|p| p.subtitle).map(|s| view! {
                            <p class="text-xs text-muted-foreground">{s}</p>
                        })}
                    </div>
                    <Button variant=ButtonVariant::Outline size=ButtonSize::Sm on:click=on_start_tutorial>
                        "Start tutorial"
                    </Button>
                </div>

                {move || match page().and_then(|p| p.embed_url) {
                    Some(url) => view! {
                        <iframe
                            node_ref=frame_ref
                            src=url
                            class="min-h-0 w-full flex-1 rounded-lg border border-border"
                            allowfullscreen=true
                        />
                    }
                    .into_any(),
                    None => view! {
                        // No embed URL is a placeholder, not an error.
                        <div class="flex min-h-0 flex-1 items-center justify-center rounded-lg border border-dashed border-border text-sm text-muted-foreground">
                            "No report has been linked to this page yet."
                        </div>
                    }
                    .into_any(),
                }}
            </Show>

            <Show when=tutorial_active fallback=|| ().into_view()>
                <TutorialOverlay />
            </Show>
        </div>
    }
}

/// Editable snapshot of the portal config. Conversion in both directions is
/// pure so the seed and save paths can be tested off the DOM.
#[derive(Clone, Debug, Default, PartialEq)]
struct SettingsForm {
    portal_name: String,
    accent_color: String,
    logo_url: String,
    home_label: String,
    home_icon: String,
}

impl SettingsForm {
    fn from_config(cfg: &PortalConfig) -> Self {
        Self {
            portal_name: cfg.portal_name.clone(),
            accent_color: cfg.accent_color.clone().unwrap_or_default(),
            logo_url: cfg.logo_url.clone().unwrap_or_default(),
            home_label: cfg.home_label.clone(),
            home_icon: cfg.home_icon.clone().unwrap_or_default(),
        }
    }

    /// Fold the form back into `config`. Blank optionals clear the field;
    /// a blank home label falls back to "Home".
    fn apply_to(&self, config: &mut PortalConfig) {
        let opt = |s: &str| {
            let t = s.trim();
            if t.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        config.portal_name = self.portal_name.clone();
        config.accent_color = opt(&self.accent_color);
        config.logo_url = opt(&self.logo_url);
        config.home_label = if self.home_label.trim().is_empty() {
            "Home".to_string()
        } else {
            self.home_label.clone()
        };
        config.home_icon = opt(&self.home_icon);
    }
}

/// The form may seed only once, and only from a settled config. Before the
/// config fetch completes the signal still holds the compiled-in defaults;
/// seeding from those and saving would overwrite the real server config.
fn settings_ready_to_seed(config_loaded: bool, already_seeded: bool) -> bool {
    config_loaded && !already_seeded
}

#[component]
pub fn SettingsPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    let portal_name: RwSignal<String> = RwSignal::new(String::new());
    let accent_color: RwSignal<String> = RwSignal::new(String::new());
    let logo_url: RwSignal<String> = RwSignal::new(String::new());
    let home_label: RwSignal<String> = RwSignal::new(String::new());
    let home_icon: RwSignal<String> = RwSignal::new(String::new());

    let saving: RwSignal<bool> = RwSignal::new(false);
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let saved: RwSignal<bool> = RwSignal::new(false);

    let seeded: RwSignal<bool> = RwSignal::new(false);
    Effect::new(move |_| {
        if !settings_ready_to_seed(app_state.0.config_loaded.get(), seeded.get_untracked()) {
            return;
        }
        seeded.set(true);
        let form = SettingsForm::from_config(&app_state.0.portal_config.get_untracked());
        portal_name.set(form.portal_name);
        accent_color.set(form.accent_color);
        logo_url.set(form.logo_url);
        home_label.set(form.home_label);
        home_icon.set(form.home_icon);
    });

    let set_theme = move |theme: ThemeMode| {
        app_state.0.portal_config.update(|c| c.theme = theme);
        save_theme(theme);
    };

    let on_save = move |_| {
        if saving.get_untracked() || !seeded.get_untracked() {
            return;
        }

        let form = SettingsForm {
            portal_name: portal_name.get_untracked(),
            accent_color: accent_color.get_untracked(),
            logo_url: logo_url.get_untracked(),
            home_label: home_label.get_untracked(),
            home_icon: home_icon.get_untracked(),
        };
        if form.portal_name.trim().is_empty() {
            error.set(Some("Portal name cannot be empty".to_string()));
            return;
        }

        let mut config = app_state.0.portal_config.get_untracked();
        form.apply_to(&mut config);

        let api_client = app_state.0.api_client.get_untracked();
        saving.set(true);
        error.set(None);
        saved.set(false);

        spawn_local(async move {
            match api_client.save_config(&config).await {
                Ok(_) => {
                    app_state.0.portal_config.set(config);
                    saved.set(true);
                }
                Err(e) => error.set(Some(e.to_string())),
            }
            saving.set(false);
        });
    };

    view! {
        <div class="max-w-lg space-y-4">
            <div class="space-y-1">
                <h1 class="text-xl font-semibold">"Settings"</h1>
                <p class="text-xs text-muted-foreground">"Portal appearance and navigation"</p>
            </div>

            <Card>
                <CardHeader>
                    <CardTitle class="text-sm">"General"</CardTitle>
                </CardHeader>
                <CardContent>
                    <div class="flex flex-col gap-4">
                        <div class="flex flex-col gap-2">
                            <Label html_for="portal_name">"Portal name"</Label>
                            <Input id="portal_name" bind_value=portal_name />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="accent_color">"Accent color"</Label>
                            <Input id="accent_color" placeholder="#2563eb" bind_value=accent_color />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="logo_url">"Logo URL"</Label>
                            <Input id="logo_url" placeholder="https://..." bind_value=logo_url />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="home_label">"Home entry label"</Label>
                            <Input id="home_label" bind_value=home_label />
                        </div>
                        <div class="flex flex-col gap-2">
                            <Label html_for="home_icon">"Home entry icon"</Label>
                            <Input id="home_icon" placeholder="emoji, icon class or inline SVG" bind_value=home_icon />
                        </div>

                        <div class="flex flex-col gap-2">
                            <Label>"Theme"</Label>
                            <div class="flex gap-2">
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| set_theme(ThemeMode::Light)
                                >
                                    "Light"
                                </Button>
                                <Button
                                    variant=ButtonVariant::Outline
                                    size=ButtonSize::Sm
                                    on:click=move |_| set_theme(ThemeMode::Dark)
                                >
                                    "Dark"
                                </Button>
                            </div>
                        </div>

                        <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                            {move || error.get().map(|e| view! {
                                <Alert class="border-destructive/30">
                                    <AlertDescription class="text-destructive">{e}</AlertDescription>
                                </Alert>
                            })}
                        </Show>

                        <Show when=move || saved.get() fallback=|| ().into_view()>
                            <Alert>
                                <AlertDescription>"Settings saved."</AlertDescription>
                            </Alert>
                        </Show>

                        <Button attr:disabled=move || saving.get() on:click=on_save>
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || saving.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if saving.get() { "Saving..." } else { "Save" }}
                            </span>
                        </Button>
                    </div>
                </CardContent>
            </Card>
        </div>
    }
}

#[component]
pub fn RootAuthed(children: ChildrenFn) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    // Store children so the view macro sees an `Fn` (not an `FnOnce`).
    let children = StoredValue::new(children);

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            <AppLayout>
                {move || children.with_value(|c| c())}
            </AppLayout>
        </Show>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    view! {
        <RootAuthed>
            <HomePage />
        </RootAuthed>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_seed_waits_for_config_fetch() {
        // Fresh load straight to the settings route: the config signal still
        // holds the compiled-in defaults, so the form must not seed yet.
        assert!(!settings_ready_to_seed(false, false));
        // Fetch settled: seed exactly once.
        assert!(settings_ready_to_seed(true, false));
        assert!(!settings_ready_to_seed(true, true));
    }

    #[test]
    fn test_settings_form_round_trips_server_config() {
        let server = PortalConfig {
            portal_name: "Contoso BI".to_string(),
            theme: ThemeMode::Dark,
            accent_color: Some("#16a34a".to_string()),
            logo_url: Some("https://example.com/logo.png".to_string()),
            home_label: "Start".to_string(),
            home_icon: Some("📊".to_string()),
        };

        // Seeding from the real config and saving unchanged must preserve it.
        let form = SettingsForm::from_config(&server);
        let mut saved = server.clone();
        form.apply_to(&mut saved);
        assert_eq!(saved, server);
    }

    #[test]
    fn test_settings_form_blank_optionals_clear_fields() {
        let mut config = PortalConfig {
            accent_color: Some("#123456".to_string()),
            home_label: "Start".to_string(),
            ..Default::default()
        };
        let form = SettingsForm {
            portal_name: "Portal".to_string(),
            accent_color: "   ".to_string(),
            logo_url: String::new(),
            home_label: String::new(),
            home_icon: String::new(),
        };
        form.apply_to(&mut config);
        assert!(config.accent_color.is_none());
        assert!(config.logo_url.is_none());
        // Blank label falls back instead of leaving Home unnamed.
        assert_eq!(config.home_label, "Home");
    }

    #[test]
    fn test_accent_style_only_when_configured() {
        let mut cfg = PortalConfig::default();
        assert_eq!(accent_style_for(&cfg), "");
        cfg.accent_color = Some("#16a34a".to_string());
        assert_eq!(accent_style_for(&cfg), "--primary: #16a34a");
    }
}

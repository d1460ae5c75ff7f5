use crate::config::TwinConfig;
use crate::storage::{SharedStorage, default_storage};
use crate::theme::{ThemeStore, theme_definition};
use crate::types::{ResolvedTheme, ThemePreference};
use crate::views::{ThemeToggle, TwinView};
use dioxus::prelude::*;
use std::sync::Arc;
use time::OffsetDateTime;

const TWIN_CSS: Asset = asset!("/assets/twin.css");
const PAGE_TITLE: &str = "Career Conversation";

const PREFERS_DARK_JS: &str =
    "return window.matchMedia('(prefers-color-scheme: dark)').matches;";

const WATCH_SCHEME_JS: &str = r#"
const mq = window.matchMedia('(prefers-color-scheme: dark)');
const handler = (e) => dioxus.send(e.matches);
mq.addEventListener('change', handler);
window.__twinUnwatchScheme = () => mq.removeEventListener('change', handler);
"#;

const UNWATCH_SCHEME_JS: &str = r#"
if (window.__twinUnwatchScheme) {
    window.__twinUnwatchScheme();
    delete window.__twinUnwatchScheme;
}
"#;

/// Theme state threaded through the component tree: the store plus the
/// storage backend its writes go to.
#[derive(Clone)]
pub struct ThemeHandle {
    pub store: Signal<ThemeStore>,
    storage: SharedStorage,
}

impl ThemeHandle {
    pub fn new(store: Signal<ThemeStore>, storage: SharedStorage) -> Self {
        Self { store, storage }
    }

    pub fn preference(&self) -> ThemePreference {
        self.store.read().preference()
    }

    pub fn set_theme(&self, preference: ThemePreference) {
        let mut store = self.store;
        store.with_mut(|s| s.set_theme(preference, self.storage.as_ref()));
    }

    fn mount(&self, os_theme: ResolvedTheme) {
        let mut store = self.store;
        store.with_mut(|s| s.mount(self.storage.as_ref(), os_theme));
    }

    fn system_changed(&self, os_theme: ResolvedTheme) {
        let mut store = self.store;
        store.with_mut(|s| {
            s.system_changed(os_theme);
        });
    }
}

impl PartialEq for ThemeHandle {
    fn eq(&self, other: &Self) -> bool {
        self.store == other.store && Arc::ptr_eq(&self.storage, &other.storage)
    }
}

#[component]
pub fn App() -> Element {
    let config = use_hook(TwinConfig::from_env);
    let storage = use_hook(default_storage);
    let store = use_signal(ThemeStore::new);
    let theme = ThemeHandle::new(store, storage);

    use_theme_mount(theme.clone());
    use_system_theme_listener(theme.clone());
    let resolved = use_memo(move || store.read().resolved());
    use_effect(move || apply_document_theme(resolved()));

    // Hide the shell until the persisted preference is loaded.
    let shell_style = if store.read().is_mounted() {
        ""
    } else {
        "visibility: hidden;"
    };
    let year = OffsetDateTime::now_utc().year();

    rsx! {
        document::Title { "{PAGE_TITLE}" }
        ThemeStyles { theme: resolved() }
        main { class: "page", style: "{shell_style}",
            div { class: "top-bar",
                ThemeToggle { theme: theme.clone() }
            }
            div { class: "chat-frame",
                div { class: "chat-container",
                    TwinView { config: config.clone() }
                }
            }
            footer { class: "page-footer",
                p { "All rights reserved \u{a9} {year}" }
            }
        }
    }
}

fn use_theme_mount(theme: ThemeHandle) {
    use_hook(move || {
        spawn(async move {
            let prefers_dark = document::eval(PREFERS_DARK_JS)
                .join::<bool>()
                .await
                .unwrap_or(true);
            theme.mount(ResolvedTheme::from_prefers_dark(prefers_dark));
        });
    });
}

/// Subscribe to OS color-scheme changes only while the preference is
/// `system`; tear the subscription down as soon as it is not.
fn use_system_theme_listener(theme: ThemeHandle) {
    let store = theme.store;
    let follows_system = use_memo(move || store.read().follows_system());
    let mut listener = use_signal(|| Option::<Task>::None);

    use_effect(move || {
        let follows = follows_system();
        if let Some(task) = listener.write().take() {
            task.cancel();
            let _ = document::eval(UNWATCH_SCHEME_JS);
        }
        if follows {
            let theme = theme.clone();
            let task = spawn(async move {
                let mut watcher = document::eval(WATCH_SCHEME_JS);
                while let Ok(prefers_dark) = watcher.recv::<bool>().await {
                    theme.system_changed(ResolvedTheme::from_prefers_dark(prefers_dark));
                }
            });
            listener.set(Some(task));
        }
    });
}

fn apply_document_theme(theme: ResolvedTheme) {
    let script = format!(
        "document.documentElement.setAttribute('data-theme', '{}');",
        theme.as_str()
    );
    let _ = document::eval(&script);
}

#[component]
fn ThemeStyles(theme: ResolvedTheme) -> Element {
    let definition = theme_definition(theme);
    rsx! {
        document::Link { rel: "stylesheet", href: TWIN_CSS }
        style { dangerous_inner_html: "{definition.css}" }
    }
}

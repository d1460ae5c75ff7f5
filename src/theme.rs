//! Theme preference store.
//!
//! Holds the visitor's light/dark/system choice, persists it through a
//! [`PreferenceStorage`], and resolves it against the OS color-scheme
//! signal while the choice is `system`.

use crate::storage::PreferenceStorage;
use crate::types::{ResolvedTheme, ThemePreference};

pub const THEME_STORAGE_KEY: &str = "theme";

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThemeStore {
    preference: ThemePreference,
    resolved: ResolvedTheme,
    os_theme: Option<ResolvedTheme>,
    mounted: bool,
}

impl ThemeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the persisted preference and resolve it. `os_theme` is the OS
    /// signal at mount time; it is only consulted for `system`.
    pub fn mount(&mut self, storage: &dyn PreferenceStorage, os_theme: ResolvedTheme) {
        match storage.get(THEME_STORAGE_KEY) {
            Ok(Some(saved)) => match saved.parse::<ThemePreference>() {
                Ok(preference) => self.preference = preference,
                Err(err) => tracing::warn!("ignoring stored theme: {}", err),
            },
            Ok(None) => {}
            Err(err) => tracing::warn!("theme storage unavailable: {}", err),
        }
        self.os_theme = Some(os_theme);
        self.mounted = true;
        self.recompute();
    }

    pub fn set_theme(&mut self, preference: ThemePreference, storage: &dyn PreferenceStorage) {
        self.preference = preference;
        if let Err(err) = storage.set(THEME_STORAGE_KEY, preference.as_str()) {
            tracing::warn!("failed to persist theme preference: {}", err);
        }
        self.recompute();
    }

    /// Feed an OS color-scheme change. Returns whether the resolved theme
    /// changed as a result.
    pub fn system_changed(&mut self, os_theme: ResolvedTheme) -> bool {
        self.os_theme = Some(os_theme);
        let before = self.resolved;
        self.recompute();
        before != self.resolved
    }

    /// Whether the OS signal currently drives the resolved theme.
    pub fn follows_system(&self) -> bool {
        self.mounted && self.preference == ThemePreference::System
    }

    pub fn preference(&self) -> ThemePreference {
        self.preference
    }

    pub fn resolved(&self) -> ResolvedTheme {
        self.resolved
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    fn recompute(&mut self) {
        self.resolved = match self.preference {
            ThemePreference::Light => ResolvedTheme::Light,
            ThemePreference::Dark => ResolvedTheme::Dark,
            ThemePreference::System => self.os_theme.unwrap_or_default(),
        };
    }
}

pub struct ThemeDefinition {
    pub css: &'static str,
}

pub fn theme_definition(theme: ResolvedTheme) -> ThemeDefinition {
    match theme {
        ResolvedTheme::Dark => ThemeDefinition { css: DARK_THEME },
        ResolvedTheme::Light => ThemeDefinition { css: LIGHT_THEME },
    }
}

const DARK_THEME: &str = r#"
:root {
    --bg-page: #07080b;
    --bg-primary: #0d0f14;
    --bg-elevated: #161a22;
    --text-primary: #f2f4f8;
    --text-secondary: #c3c9d4;
    --text-muted: #7d8594;
    --border-subtle: rgba(255, 255, 255, 0.06);
    --border-default: rgba(255, 255, 255, 0.12);
    --accent: #34d399;
    --accent-muted: rgba(52, 211, 153, 0.12);
    --accent-glow: rgba(52, 211, 153, 0.35);
    --user-bubble-bg: rgba(52, 211, 153, 0.10);
    --user-bubble-border: rgba(52, 211, 153, 0.25);
    --bot-bubble-bg: #161a22;
    --input-wrapper-bg: #11141a;
    --toggle-bg: #11141a;
    --toggle-active-bg: #1d222c;
    --code-inline-bg: rgba(255, 255, 255, 0.08);
    --code-block-bg: #0a0c10;
    --code-block-border: rgba(255, 255, 255, 0.10);
}
body { background: var(--bg-page); color: var(--text-primary); color-scheme: dark; }
"#;

const LIGHT_THEME: &str = r#"
:root {
    --bg-page: #f3f5f8;
    --bg-primary: #ffffff;
    --bg-elevated: #f5f7fa;
    --text-primary: #111827;
    --text-secondary: #374151;
    --text-muted: #6b7280;
    --border-subtle: rgba(17, 24, 39, 0.06);
    --border-default: rgba(17, 24, 39, 0.12);
    --accent: #059669;
    --accent-muted: rgba(5, 150, 105, 0.10);
    --accent-glow: rgba(5, 150, 105, 0.25);
    --user-bubble-bg: rgba(5, 150, 105, 0.08);
    --user-bubble-border: rgba(5, 150, 105, 0.22);
    --bot-bubble-bg: #f5f7fa;
    --input-wrapper-bg: #ffffff;
    --toggle-bg: #ffffff;
    --toggle-active-bg: #eef1f5;
    --code-inline-bg: #eef1f5;
    --code-block-bg: #0f172a;
    --code-block-border: rgba(17, 24, 39, 0.14);
}
body { background: var(--bg-page); color: var(--text-primary); color-scheme: light; }
"#;

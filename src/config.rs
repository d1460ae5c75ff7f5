//! Runtime configuration for the twin client.
//!
//! Every key is looked up in the process environment first, then in the
//! bundled `assets/config.env`, then falls back to a built-in default.

use std::collections::HashMap;
use std::env;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_PERSONA_NAME: &str = "Digital Twin";

pub const API_URL_KEY: &str = "TWIN_API_URL";
pub const HEALTH_API_KEY_KEY: &str = "TWIN_HEALTH_API_KEY";
pub const CHAT_API_KEY_KEY: &str = "TWIN_CHAT_API_KEY";
pub const PERSONA_NAME_KEY: &str = "TWIN_PERSONA_NAME";

/// Bundled config for builds without a usable process environment (wasm, mobile)
pub const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwinConfig {
    pub api_url: String,
    pub health_api_key: String,
    pub chat_api_key: String,
    pub persona_name: String,
}

impl Default for TwinConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            health_api_key: String::new(),
            chat_api_key: String::new(),
            persona_name: DEFAULT_PERSONA_NAME.to_string(),
        }
    }
}

impl TwinConfig {
    /// Resolve from the environment, falling back to the bundled config.
    pub fn from_env() -> Self {
        Self::resolve(|key| env::var(key).ok(), BUNDLED_CONFIG)
    }

    /// Resolve with an explicit lookup, so callers (and tests) control the
    /// environment side.
    pub fn resolve<F>(lookup: F, bundled: &str) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let bundled = parse_env_lines(bundled);
        let get = |key: &str| {
            lookup(key)
                .or_else(|| bundled.get(key).cloned())
                .filter(|value| !value.trim().is_empty())
        };

        let defaults = Self::default();
        let api_url = get(API_URL_KEY).unwrap_or(defaults.api_url);
        Self {
            api_url: api_url.trim().trim_end_matches('/').to_string(),
            health_api_key: get(HEALTH_API_KEY_KEY).unwrap_or(defaults.health_api_key),
            chat_api_key: get(CHAT_API_KEY_KEY).unwrap_or(defaults.chat_api_key),
            persona_name: get(PERSONA_NAME_KEY).unwrap_or(defaults.persona_name),
        }
    }

    pub fn health_url(&self) -> String {
        format!("{}/health", self.api_url)
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.api_url)
    }
}

/// Parse `KEY=VALUE` lines, skipping blanks and `#` comments.
pub fn parse_env_lines(text: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            let value = value.trim().trim_matches('"');
            values.insert(key.trim().to_string(), value.to_string());
        }
    }
    values
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn parses_env_lines_and_skips_comments() {
        let parsed = parse_env_lines(
            "# comment\n\nTWIN_API_URL = https://api.example.com\nTWIN_CHAT_API_KEY=\"abc\"\ngarbage\n",
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed["TWIN_API_URL"], "https://api.example.com");
        assert_eq!(parsed["TWIN_CHAT_API_KEY"], "abc");
    }

    #[test]
    fn falls_back_to_defaults() {
        let config = TwinConfig::resolve(no_env, "");
        assert_eq!(config, TwinConfig::default());
        assert_eq!(config.health_url(), "http://localhost:8000/health");
        assert_eq!(config.chat_url(), "http://localhost:8000/chat");
    }

    #[test]
    fn environment_overrides_bundled_values() {
        let bundled = "TWIN_API_URL=https://bundled.example.com\nTWIN_HEALTH_API_KEY=bundled-health";
        let config = TwinConfig::resolve(
            |key| (key == API_URL_KEY).then(|| "https://env.example.com/".to_string()),
            bundled,
        );
        assert_eq!(config.api_url, "https://env.example.com");
        assert_eq!(config.health_api_key, "bundled-health");
        assert_eq!(config.chat_api_key, "");
    }

    #[test]
    fn blank_values_use_default() {
        let config = TwinConfig::resolve(no_env, "TWIN_PERSONA_NAME=\nTWIN_API_URL=  ");
        assert_eq!(config.persona_name, DEFAULT_PERSONA_NAME);
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}

//! Runtime configuration.
//!
//! Values come from the process environment, a `.env` file during desktop
//! development, or the config bundled into mobile builds. Environment always
//! wins over the bundled file.

use crate::ai::cascade::DEFAULT_HISTORY_WINDOW;
use crate::ai::gemini::DEFAULT_API_BASE;
use crate::ai::{
    ApiVersion, CompletionBackend, GeminiRestBackend, ModelCascade, ModelCatalog, RigGeminiBackend,
};

/// Bundled config for mobile builds (iOS/Android)
const BUNDLED_CONFIG: &str = include_str!("../assets/config.env");

const PLACEHOLDER_KEY: &str = "YOUR_GEMINI_API_KEY";

pub fn load_dotenv() {
    // First try to load from .env file (desktop dev)
    if dotenvy::dotenv().is_ok() {
        return;
    }

    // Fall back to bundled config (mobile builds)
    load_bundled_config();
}

fn load_bundled_config() {
    for (key, value) in parse_env_lines(BUNDLED_CONFIG) {
        // Only set if not already set (allow env override)
        if std::env::var(&key).is_err() {
            // SAFETY: called from main before the runtime or any other thread starts
            unsafe {
                std::env::set_var(key, value);
            }
        }
    }
}

/// Parses `KEY=VALUE` lines, skipping blanks and `#` comments.
fn parse_env_lines(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .filter(|(key, _)| !key.is_empty())
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub api_key: Option<String>,
    pub api_base: String,
    pub catalog: ModelCatalog,
    pub api_versions: Vec<ApiVersion>,
    pub history_window: usize,
    pub sdk_fallback: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            catalog: ModelCatalog::default(),
            api_versions: ApiVersion::ALL.to_vec(),
            history_window: DEFAULT_HISTORY_WINDOW,
            sdk_fallback: true,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from any key lookup. Unparseable values fall back to
    /// their defaults with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let api_key = get("GEMINI_API_KEY").filter(|key| key != PLACEHOLDER_KEY);

        let catalog = ModelCatalog {
            priority: get("GEMINI_PRIORITY_MODELS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.catalog.priority),
            fallback: get("GEMINI_FALLBACK_MODELS")
                .map(|raw| split_list(&raw))
                .unwrap_or(defaults.catalog.fallback),
        };

        let api_versions = match get("GEMINI_API_VERSIONS") {
            Some(raw) => {
                let parsed: Result<Vec<ApiVersion>, String> =
                    split_list(&raw).iter().map(|v| v.parse()).collect();
                match parsed {
                    Ok(versions) if !versions.is_empty() => versions,
                    Ok(_) => defaults.api_versions,
                    Err(err) => {
                        tracing::warn!(%err, "ignoring GEMINI_API_VERSIONS");
                        defaults.api_versions
                    }
                }
            }
            None => defaults.api_versions,
        };

        let history_window = match get("GEMINI_HISTORY_WINDOW") {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "ignoring GEMINI_HISTORY_WINDOW");
                defaults.history_window
            }),
            None => defaults.history_window,
        };

        let sdk_fallback = get("GEMINI_SDK_FALLBACK")
            .map(|raw| {
                matches!(
                    raw.to_ascii_lowercase().as_str(),
                    "1" | "true" | "yes" | "on"
                )
            })
            .unwrap_or(defaults.sdk_fallback);

        Self {
            api_key,
            api_base: get("GEMINI_API_BASE").unwrap_or(defaults.api_base),
            catalog,
            api_versions,
            history_window,
            sdk_fallback,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Wires the REST mechanism (and the SDK fallback when enabled) into a
    /// cascade. `None` when no API key is configured.
    pub fn build_cascade(&self) -> Option<ModelCascade> {
        let key = self.api_key.as_deref()?;

        let rest = || {
            GeminiRestBackend::with_base_url(&self.api_base, key)
                .with_versions(self.api_versions.clone())
        };

        let mut mechanisms: Vec<Box<dyn CompletionBackend>> = vec![Box::new(rest())];
        if self.sdk_fallback {
            match RigGeminiBackend::with_base_url(&self.api_base, key) {
                Ok(sdk) => mechanisms.push(Box::new(sdk)),
                Err(err) => tracing::warn!(error = %err, "SDK fallback disabled"),
            }
        }

        Some(
            ModelCascade::new(Box::new(rest()), mechanisms, self.catalog.clone())
                .with_history_window(self.history_window),
        )
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

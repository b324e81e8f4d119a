//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (LADLE_*)
//! 2. TOML config file (if LADLE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Identity sent with every document fetch. Many sites serve degraded markup
/// to non-browser user agents.
pub const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0.0.0 Safari/537.36";

/// Social and video hosts that are never followed as recipe links.
pub const DEFAULT_BLOCKED_DOMAINS: &[&str] =
    &["youtube.com", "youtu.be", "instagram.com", "tiktok.com", "facebook.com", "twitter.com", "x.com"];

/// URL substrings that suggest a dedicated recipe page.
pub const DEFAULT_RECIPE_HINTS: &[&str] = &["/recipe", "/recipes", "ingredients", "directions", "instructions", "print"];

/// Phrases pointing at a link the page itself does not carry.
pub const DEFAULT_MANUAL_LINK_PHRASES: &[&str] = &["link in bio", "link-in-bio", "linkinbio"];

/// Body markers of bot-challenge and consent pages.
pub const DEFAULT_INTERSTITIAL_MARKERS: &[&str] = &[
    "consent.youtube.com",
    "before you continue",
    "unusual traffic",
    "our systems have detected",
    "detected unusual traffic",
    "captcha",
];

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (LADLE_*)
/// 2. TOML config file (if LADLE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the OpenAI-compatible extraction model.
    ///
    /// Set via LADLE_OPENAI_API_KEY environment variable.
    /// Required only when the AI fallback runs.
    #[serde(default)]
    pub openai_api_key: Option<String>,

    /// Model used for AI extraction.
    ///
    /// Set via LADLE_OPENAI_MODEL environment variable.
    #[serde(default = "default_openai_model")]
    pub openai_model: String,

    /// Base URL of the OpenAI-compatible API.
    ///
    /// Set via LADLE_OPENAI_BASE_URL environment variable.
    #[serde(default = "default_openai_base_url")]
    pub openai_base_url: String,

    /// Model request timeout in milliseconds.
    ///
    /// Set via LADLE_LLM_TIMEOUT_MS environment variable.
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,

    /// Path to the SQLite recipe store.
    ///
    /// Set via LADLE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for document fetches.
    ///
    /// Set via LADLE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Document fetch timeout in milliseconds.
    ///
    /// Set via LADLE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to read per document.
    ///
    /// Set via LADLE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Maximum number of redirects to follow.
    ///
    /// Set via LADLE_MAX_REDIRECTS environment variable.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Allow fetching hosts that resolve to private or loopback addresses.
    ///
    /// Set via LADLE_ALLOW_PRIVATE_NETWORKS environment variable.
    #[serde(default)]
    pub allow_private_networks: bool,

    /// Hosts never accepted as a resolved recipe link.
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,

    /// URL substrings that mark a candidate as a likely recipe page.
    #[serde(default = "default_recipe_hints")]
    pub recipe_hints: Vec<String>,

    /// Phrases that signal an out-of-band link ("link in bio").
    #[serde(default = "default_manual_link_phrases")]
    pub manual_link_phrases: Vec<String>,

    /// Case-insensitive body markers of bot-challenge pages.
    #[serde(default = "default_interstitial_markers")]
    pub interstitial_markers: Vec<String>,
}

fn default_openai_model() -> String {
    "gpt-4o-mini".into()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

fn default_llm_timeout_ms() -> u64 {
    60_000
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./ladle-recipes.sqlite")
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    8 * 1024 * 1024
}

fn default_max_redirects() -> usize {
    10
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn default_blocked_domains() -> Vec<String> {
    to_strings(DEFAULT_BLOCKED_DOMAINS)
}

fn default_recipe_hints() -> Vec<String> {
    to_strings(DEFAULT_RECIPE_HINTS)
}

fn default_manual_link_phrases() -> Vec<String> {
    to_strings(DEFAULT_MANUAL_LINK_PHRASES)
}

fn default_interstitial_markers() -> Vec<String> {
    to_strings(DEFAULT_INTERSTITIAL_MARKERS)
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            openai_model: default_openai_model(),
            openai_base_url: default_openai_base_url(),
            llm_timeout_ms: default_llm_timeout_ms(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            max_redirects: default_max_redirects(),
            allow_private_networks: false,
            blocked_domains: default_blocked_domains(),
            recipe_hints: default_recipe_hints(),
            manual_link_phrases: default_manual_link_phrases(),
            interstitial_markers: default_interstitial_markers(),
        }
    }
}

impl AppConfig {
    /// Document fetch timeout as Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Model request timeout as Duration.
    pub fn llm_timeout(&self) -> Duration {
        Duration::from_millis(self.llm_timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `LADLE_`
    /// 2. TOML file from `LADLE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("LADLE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("LADLE_")
                .ignore(&["config_file"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

//! Configuration module for Serenity

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::models::Category;
use crate::theme::Theme;

/// Local development backend
pub const DEVELOPMENT_API_URL: &str = "http://127.0.0.1:3000/api/v1";

/// Hosted production backend
pub const PRODUCTION_API_URL: &str = "https://serenity-api-da5d188219d5.herokuapp.com/api/v1";

/// Which backend to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local server on port 3000
    Development,
    /// Hosted HTTPS server
    Production,
}

impl Default for Environment {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl Environment {
    /// Base URL for this environment
    pub const fn api_url(self) -> &'static str {
        match self {
            Self::Development => DEVELOPMENT_API_URL,
            Self::Production => PRODUCTION_API_URL,
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Selected theme
    #[serde(default)]
    pub theme: Theme,

    /// Backend environment
    #[serde(default)]
    pub environment: Environment,

    /// Explicit base URL, overriding `environment`
    #[serde(default)]
    pub api_url: Option<String>,

    /// Prefetch the next page when this many verses or fewer remain
    #[serde(default = "default_prefetch_threshold")]
    pub prefetch_threshold: usize,

    /// Quiet period before a search-as-you-type query fires
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Shortest query that triggers a search
    #[serde(default = "default_search_min_chars")]
    pub search_min_chars: usize,

    /// Consecutive feed failures before a notice is shown
    #[serde(default = "default_failure_notice_after")]
    pub failure_notice_after: u32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Category preselected on the "Your Choice" tab
    #[serde(default)]
    pub default_category: Option<String>,
}

const fn default_prefetch_threshold() -> usize {
    crate::feed::DEFAULT_PREFETCH_THRESHOLD
}

const fn default_search_debounce_ms() -> u64 {
    500
}

const fn default_search_min_chars() -> usize {
    2
}

const fn default_failure_notice_after() -> u32 {
    3
}

const fn default_request_timeout() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            environment: Environment::default(),
            api_url: None,
            prefetch_threshold: default_prefetch_threshold(),
            search_debounce_ms: default_search_debounce_ms(),
            search_min_chars: default_search_min_chars(),
            failure_notice_after: default_failure_notice_after(),
            request_timeout_secs: default_request_timeout(),
            default_category: None,
        }
    }
}

impl Config {
    /// Load config from the default path or create default
    pub fn load() -> Result<Self> {
        let path = crate::paths::config_path()?;
        Self::load_from(&path)
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            Ok(Self::default())
        }
    }

    /// Save config to the default path
    pub fn save(&self) -> Result<()> {
        let path = crate::paths::config_path()?;
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Base URL of the backend, honouring the override
    pub fn api_base_url(&self) -> &str {
        self.api_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.environment.api_url())
    }

    /// Request timeout as a `Duration`
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Debounce window as a `Duration`
    pub const fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// The configured default category, if it names a known one
    pub fn default_category(&self) -> Option<Category> {
        self.default_category
            .as_deref()
            .map(Category::new)
            .filter(Category::is_known)
    }
}

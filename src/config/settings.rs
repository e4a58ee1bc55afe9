use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Write debug logs to a file
    #[serde(default)]
    pub debug: bool,

    /// Log file (or directory) used when `debug` is on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_path: Option<String>,

    /// How debug log files are rotated
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_rotation: Option<DebugLogRotation>,

    /// Number of rotated log files to keep (0 keeps everything)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_log_keep: Option<usize>,

    /// GitHub API access
    #[serde(default)]
    pub github: GithubConfig,

    /// Search behaviour
    #[serde(default)]
    pub search: SearchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debug: false,
            debug_log_path: None,
            debug_log_rotation: None,
            debug_log_keep: None,
            github: GithubConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

/// Connection settings for the GitHub REST API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GithubConfig {
    /// API base URL
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Personal access token. Without one, requests are unauthenticated
    /// and subject to the lower anonymous rate limit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Transport timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Longest rate-limit wait the client will sit through before retrying
    #[serde(default = "default_max_retry_wait_secs")]
    pub max_retry_wait_secs: u64,
}

impl GithubConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_retry_wait(&self) -> Duration {
        Duration::from_secs(self.max_retry_wait_secs)
    }

    /// Token with surrounding whitespace removed, `None` when blank.
    pub fn token(&self) -> Option<&str> {
        self.token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            token: None,
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            max_retry_wait_secs: default_max_retry_wait_secs(),
        }
    }
}

/// Paging and input behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchConfig {
    /// Results per page
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Quiet period before a typed keyword is searched
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Number of page links shown around the current page
    #[serde(default = "default_page_range")]
    pub page_range: usize,

    /// Number of page links always shown at each end
    #[serde(default = "default_margin_pages")]
    pub margin_pages: usize,
}

impl SearchConfig {
    /// Page size actually requested, kept within 1..=100
    pub fn per_page(&self) -> u32 {
        self.per_page.clamp(1, crate::search::MAX_PER_PAGE)
    }

    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            per_page: default_per_page(),
            debounce_ms: default_debounce_ms(),
            page_range: default_page_range(),
            margin_pages: default_margin_pages(),
        }
    }
}

/// Debug log rotation strategy
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DebugLogRotation {
    /// Append to a single file
    None,
    /// One file per day
    Daily,
    /// One file per program run
    Session,
}

fn default_api_base() -> String {
    "https://api.github.com".to_string()
}

fn default_user_agent() -> String {
    concat!("ghsearch/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_retry_wait_secs() -> u64 {
    60
}

fn default_per_page() -> u32 {
    10
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_page_range() -> usize {
    10
}

fn default_margin_pages() -> usize {
    1
}

pub mod coordinator;
pub mod debounce;
pub mod pagination;
pub mod providers;
pub mod rate_limit;
pub mod transport;

pub use coordinator::{FetchTicket, SearchCoordinator, SearchPhase, TicketId};
pub use debounce::Debouncer;
pub use pagination::{page_count, PageLink, PageSelection, PageWindow, Paginator};

use serde::{Deserialize, Serialize};

/// Largest page size the search API accepts
pub const MAX_PER_PAGE: u32 = 100;

/// Repository search abstraction - the TUI only talks to this trait
#[async_trait::async_trait]
pub trait RepositorySearch: Send + Sync {
    /// Fetch one page of repositories matching `params.keyword`, sorted by stars (descending)
    async fn search(&self, params: &SearchParams, per_page: u32) -> Result<SearchPage, SearchError>;
}

/// Keyword and page number driving one fetch cycle.
///
/// Replaced, never mutated: every settle or page selection produces a new value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchParams {
    pub keyword: String,
    /// 1-based page number
    pub page: u32,
}

impl SearchParams {
    pub fn new(keyword: impl Into<String>, page: u32) -> Self {
        Self {
            keyword: keyword.into(),
            page: page.max(1),
        }
    }

    /// Params for the first page of `keyword`
    pub fn first_page(keyword: impl Into<String>) -> Self {
        Self::new(keyword, 1)
    }

    /// Same keyword, different page
    pub fn with_page(&self, page: u32) -> Self {
        Self::new(self.keyword.clone(), page)
    }

    /// Whether there is nothing to search for
    pub fn is_empty(&self) -> bool {
        self.keyword.trim().is_empty()
    }
}

impl Default for SearchParams {
    fn default() -> Self {
        Self::first_page("")
    }
}

/// One page of search results as returned by `GET /search/repositories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of matches across all pages
    pub total_count: u64,
    /// Set by GitHub when the search timed out before finishing
    #[serde(default)]
    pub incomplete_results: bool,
    pub items: Vec<RepositoryItem>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A repository, sourced verbatim from the API response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryItem {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
    pub stargazers_count: u64,
    #[serde(default)]
    pub description: Option<String>,
    pub html_url: String,
    #[serde(default)]
    pub language: Option<String>,
}

impl RepositoryItem {
    /// `owner/name` when available, otherwise the bare name
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.name)
    }
}

fn default_visibility() -> String {
    "public".to_string()
}

/// Search-related errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The keyword was empty, so there is nothing to search yet
    #[error("Search keyword is empty")]
    EmptyQuery,

    /// Primary rate limit hit again after the automatic retry
    #[error("API rate limit exceeded: {message}")]
    RateLimited { message: String },

    /// Abuse-detection limit; never retried
    #[error("Secondary rate limit triggered: {message}")]
    SecondaryRateLimited { message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

impl SearchError {
    /// Whether this failure should be shown to the user.
    ///
    /// An empty keyword just means "no search yet".
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, SearchError::EmptyQuery)
    }
}

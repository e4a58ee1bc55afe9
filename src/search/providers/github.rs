use crate::config::GithubConfig;
use crate::search::rate_limit::{send_with_rate_limit, RateLimitPolicy, RateLimitSignal};
use crate::search::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::search::{RepositorySearch, SearchError, SearchPage, SearchParams};
use regex::Regex;
use serde::Deserialize;
use std::sync::{Arc, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Wait used when a primary rate limit carries no usable hint
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// GitHub repository search client
///
/// Documentation: https://docs.github.com/en/rest/search/search#search-repositories
/// Unauthenticated requests are allowed but share a much lower search quota.
pub struct GithubSearchClient {
    transport: Arc<dyn Transport>,
    config: GithubConfig,
    policy: RateLimitPolicy,
}

impl GithubSearchClient {
    /// Create a client talking to the real API over reqwest
    pub fn new(config: GithubConfig) -> Self {
        let transport = Arc::new(ReqwestTransport::new(config.timeout()));
        Self::with_transport(config, transport)
    }

    /// Create a client over an arbitrary transport
    pub fn with_transport(config: GithubConfig, transport: Arc<dyn Transport>) -> Self {
        if config.token().is_none() {
            tracing::warn!("no GitHub token configured, using unauthenticated rate limits");
        }

        let policy = RateLimitPolicy::single_retry(classify_rate_limit, config.max_retry_wait());

        Self {
            transport,
            config,
            policy,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.config.token().is_some()
    }

    /// Build the `GET /search/repositories` request for `params`
    pub fn build_request(&self, params: &SearchParams, per_page: u32) -> HttpRequest {
        let url = format!(
            "{}/search/repositories",
            self.config.api_base.trim_end_matches('/')
        );

        let mut request = HttpRequest::get(url)
            .query("q", &params.keyword)
            .query("sort", "stars")
            .query("order", "desc")
            .query("per_page", per_page)
            .query("page", params.page)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header("User-Agent", self.config.user_agent.clone());

        if let Some(token) = self.config.token() {
            request = request.header("Authorization", format!("Bearer {token}"));
        }

        request
    }
}

#[async_trait::async_trait]
impl RepositorySearch for GithubSearchClient {
    async fn search(&self, params: &SearchParams, per_page: u32) -> Result<SearchPage, SearchError> {
        if params.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        tracing::debug!(
            keyword = %params.keyword,
            page = params.page,
            per_page,
            "performing github repository search"
        );

        let request = self.build_request(params, per_page);
        let response = send_with_rate_limit(self.transport.as_ref(), &request, &self.policy).await?;

        if !response.is_success() {
            let error = classify_failure(&response);
            if error.is_user_visible() {
                tracing::warn!(
                    status = response.status,
                    error = %crate::logging::redact_secrets(&response.body),
                    "github search api error"
                );
            }
            return Err(error);
        }

        let page: SearchPage = serde_json::from_str(&response.body)
            .map_err(|e| SearchError::Decode(e.to_string()))?;

        tracing::debug!(
            keyword = %params.keyword,
            total_count = page.total_count,
            result_count = page.items.len(),
            "github search completed"
        );

        Ok(page)
    }
}

/// Error payload GitHub attaches to 4xx responses
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Map a non-success, non-rate-limited response onto the error taxonomy
fn classify_failure(response: &HttpResponse) -> SearchError {
    let body: ApiErrorBody = serde_json::from_str(&response.body).unwrap_or_default();

    let missing_query = response.status == 422
        && body
            .errors
            .iter()
            .any(|e| e.field.as_deref() == Some("q") && e.code.as_deref() == Some("missing"));
    if missing_query {
        return SearchError::EmptyQuery;
    }

    SearchError::Api {
        status: response.status,
        message: body.message.unwrap_or_else(|| response.message()),
    }
}

fn secondary_limit_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bsecondary rate\b|abuse detection").expect("valid secondary limit pattern")
    })
}

/// Classify GitHub rate-limit responses.
///
/// Secondary limits are recognised by their message; primary limits by
/// `x-ratelimit-remaining: 0`, a `retry-after` hint, or a bare 429.
pub fn classify_rate_limit(response: &HttpResponse) -> RateLimitSignal {
    if !matches!(response.status, 403 | 429) {
        return RateLimitSignal::Clear;
    }

    let retry_after = response
        .header("retry-after")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs);

    if secondary_limit_pattern().is_match(&response.message()) {
        return RateLimitSignal::Secondary { retry_after };
    }

    let quota_exhausted = response.header("x-ratelimit-remaining").map(str::trim) == Some("0");
    if !(quota_exhausted || retry_after.is_some() || response.status == 429) {
        // A plain 403 is a permissions problem, not a rate limit.
        return RateLimitSignal::Clear;
    }

    let until_reset = response
        .header("x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(|reset| delay_until_reset(reset, unix_now()));

    RateLimitSignal::Primary {
        retry_after: retry_after.or(until_reset).unwrap_or(DEFAULT_RETRY_AFTER),
    }
}

/// Seconds from `now` until the epoch-seconds `reset`, never negative
pub fn delay_until_reset(reset: u64, now: u64) -> Duration {
    Duration::from_secs(reset.saturating_sub(now))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

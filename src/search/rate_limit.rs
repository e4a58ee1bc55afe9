//! Retry decorator for rate-limited requests.
//!
//! Wraps a [`Transport`] call: a primary rate-limit signal is retried after
//! the indicated delay up to `max_retries` times, a secondary (abuse) signal
//! is never retried.

use crate::search::transport::{HttpRequest, HttpResponse, Transport};
use crate::search::SearchError;
use std::time::Duration;

/// What a response says about rate limiting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitSignal {
    /// Not rate limited
    Clear,
    /// Quota exhausted; safe to retry after `retry_after`
    Primary { retry_after: Duration },
    /// Abuse detection; back off, do not retry
    Secondary { retry_after: Option<Duration> },
}

/// Classification function deciding which signal a response carries
pub type Classifier = fn(&HttpResponse) -> RateLimitSignal;

/// Retry ceiling, longest acceptable wait and the classifier to apply
#[derive(Debug, Clone, Copy)]
pub struct RateLimitPolicy {
    pub max_retries: u32,
    pub max_wait: Duration,
    pub classify: Classifier,
}

impl RateLimitPolicy {
    /// Retry a primary limit once, waiting at most `max_wait`
    pub fn single_retry(classify: Classifier, max_wait: Duration) -> Self {
        Self {
            max_retries: 1,
            max_wait,
            classify,
        }
    }
}

/// Send `request` through `transport`, applying `policy`.
///
/// Non-rate-limited responses (successful or not) are returned as-is; the
/// caller classifies other HTTP failures.
pub async fn send_with_rate_limit<T>(
    transport: &T,
    request: &HttpRequest,
    policy: &RateLimitPolicy,
) -> Result<HttpResponse, SearchError>
where
    T: Transport + ?Sized,
{
    let mut retries = 0u32;

    loop {
        let response = transport.get(request).await?;

        match (policy.classify)(&response) {
            RateLimitSignal::Clear => return Ok(response),
            RateLimitSignal::Secondary { retry_after } => {
                tracing::warn!(
                    url = %request.url,
                    status = response.status,
                    retry_after_secs = retry_after.map(|d| d.as_secs()),
                    "secondary rate limit detected, not retrying"
                );
                return Err(SearchError::SecondaryRateLimited {
                    message: response.message(),
                });
            }
            RateLimitSignal::Primary { retry_after } => {
                tracing::warn!(
                    url = %request.url,
                    status = response.status,
                    retry_count = retries,
                    "request quota exhausted"
                );

                if retries >= policy.max_retries {
                    return Err(SearchError::RateLimited {
                        message: response.message(),
                    });
                }
                if retry_after > policy.max_wait {
                    tracing::warn!(
                        retry_after_secs = retry_after.as_secs(),
                        max_wait_secs = policy.max_wait.as_secs(),
                        "rate limit wait too long, giving up"
                    );
                    return Err(SearchError::RateLimited {
                        message: response.message(),
                    });
                }

                tracing::info!(retry_after_secs = retry_after.as_secs(), "retrying after rate limit");
                tokio::time::sleep(retry_after).await;
                retries += 1;
            }
        }
    }
}

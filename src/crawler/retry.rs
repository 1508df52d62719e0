use crate::config::FetchConfig;
use crate::crawler::fetcher::{fetch_url, FetchOutcome};
use reqwest::Client;
use std::time::Duration;

/// Bounded retry with exponential backoff for transient fetch failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Extra attempts after the first
    pub max_retries: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Delay before retry number `attempt` (0-based): `base_delay * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&FetchConfig::default())
    }
}

impl From<&FetchConfig> for RetryPolicy {
    fn from(config: &FetchConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.retry_base_delay_ms),
        )
    }
}

/// Fetches a URL, retrying timeouts and 5xx responses
///
/// Non-transient failures (404, 429, connection errors) and wrong content
/// types are returned at once. After the last retry the final `Failed`
/// outcome is returned.
pub async fn fetch_with_retry(client: &Client, url: &str, policy: &RetryPolicy) -> FetchOutcome {
    let mut attempt = 0;

    loop {
        let outcome = fetch_url(client, url).await;

        match &outcome {
            FetchOutcome::Failed(failure)
                if failure.is_transient() && attempt < policy.max_retries =>
            {
                let delay = policy.delay_for(attempt);
                tracing::debug!(
                    "Transient failure for {} ({}), retry {}/{} in {:?}",
                    url,
                    failure.kind.as_str(),
                    attempt + 1,
                    policy.max_retries,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            _ => return outcome,
        }
    }
}

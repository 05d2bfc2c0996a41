//! Shared HTTP plumbing for listing and detail requests.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::ScraperError;
use crate::rate_limit::retry_with_backoff;

/// How hard to retry a request that failed at the transport level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure. `0` disables retries.
    pub max_retries: u32,
    /// Base delay for exponential back-off: `backoff_base_ms * 2^(n-1)` before retry `n`.
    pub backoff_base_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_base_ms: 5_000,
        }
    }
}

/// A `reqwest` client plus the retry policy every directory request uses.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct Transport {
    client: Client,
    retry: RetryPolicy,
}

impl Transport {
    /// Builds a transport with the given timeout, `User-Agent`, and retry policy.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(
        timeout_secs: u64,
        user_agent: &str,
        retry: RetryPolicy,
    ) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client, retry })
    }

    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Sends a form-encoded POST and returns the response body.
    ///
    /// # Errors
    ///
    /// - [`ScraperError::Http`]: network failure after all retries.
    /// - [`ScraperError::RateLimited`]: HTTP 429 after all retries.
    /// - [`ScraperError::UnexpectedStatus`]: any other non-2xx status (5xx retried).
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&'static str, String)],
    ) -> Result<String, ScraperError> {
        let client = &self.client;
        retry_with_backoff(self.retry.max_retries, self.retry.backoff_base_ms, move || async move {
            let response = client.post(url).form(form).send().await?;
            read_body(url, response).await
        })
        .await
    }

    /// Sends a GET and returns the response body.
    ///
    /// # Errors
    ///
    /// Same as [`Transport::post_form`].
    pub async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        let client = &self.client;
        retry_with_backoff(self.retry.max_retries, self.retry.backoff_base_ms, move || async move {
            let response = client.get(url).send().await?;
            read_body(url, response).await
        })
        .await
    }
}

async fn read_body(url: &str, response: Response) -> Result<String, ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(0);
        return Err(ScraperError::RateLimited {
            url: url.to_owned(),
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response.text().await?)
}

//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeout
//! - Capping the number of requests in flight across the whole crawl
//! - Retrying transient failures with a fixed delay
//! - Error classification

use crate::config::CrawlerConfig;
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Terminal outcome of a fetch that produced no body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Request timeout for {url} after {attempts} attempt(s)")]
    Timeout { url: String, attempts: u32 },

    #[error("Transport error for {url} after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        message: String,
        attempts: u32,
    },

    #[error("Fetch of {url} cancelled")]
    Cancelled { url: String },
}

impl FetchError {
    /// True when the fetch was stopped by cancellation rather than failing
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Fetcher settings
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Total attempts per URL, at least 1
    pub max_attempts: u32,

    /// Fixed delay between attempts
    pub retry_delay: Duration,

    /// Per-request timeout
    pub timeout: Duration,

    /// Ceiling on requests in flight
    pub max_connections: usize,

    /// User-Agent header value
    pub user_agent: String,
}

impl From<&CrawlerConfig> for FetchConfig {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
            timeout: Duration::from_millis(config.timeout_ms),
            max_connections: config.max_connections.max(1) as usize,
            user_agent: config.user_agent.clone(),
        }
    }
}

/// One attempt's failure and whether another attempt may help
struct AttemptError {
    error: FetchError,
    retryable: bool,
}

/// Shared HTTP fetcher
///
/// Every fetch of the crawl goes through one `Fetcher`, so its semaphore is
/// the global concurrency ceiling. A permit is held for the duration of one
/// attempt and released while waiting out the retry delay.
pub struct Fetcher {
    client: Client,
    permits: Arc<Semaphore>,
    config: FetchConfig,
    cancel: CancellationToken,
}

impl Fetcher {
    /// Creates a fetcher; `cancel` stops fetches that have not started yet
    pub fn new(config: FetchConfig, cancel: CancellationToken) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config)?;
        let permits = Arc::new(Semaphore::new(config.max_connections));

        Ok(Self {
            client,
            permits,
            config,
            cancel,
        })
    }

    /// Fetches a URL body, retrying per policy
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | HTTP 2xx | Return body |
    /// | HTTP 5xx | Retry after delay |
    /// | Timeout / connection / body read error | Retry after delay |
    /// | Other HTTP status | Fail immediately |
    /// | Cancellation before a request starts | `FetchError::Cancelled` |
    ///
    /// A request already on the wire is allowed to finish.
    pub async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            let error = match self.attempt(url, attempt).await {
                Ok(body) => return Ok(body),
                Err(AttemptError {
                    error,
                    retryable: true,
                }) if attempt < self.config.max_attempts => error,
                Err(AttemptError { error, .. }) => return Err(error),
            };

            tracing::debug!(
                "Attempt {}/{} failed ({}), retrying in {:?}",
                attempt,
                self.config.max_attempts,
                error,
                self.config.retry_delay
            );

            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(self.cancelled(url)),
                _ = tokio::time::sleep(self.config.retry_delay) => {}
            }
        }
    }

    async fn attempt(&self, url: &Url, attempt: u32) -> Result<String, AttemptError> {
        let _permit = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                return Err(AttemptError {
                    error: self.cancelled(url),
                    retryable: false,
                });
            }
            permit = self.permits.acquire() => permit.map_err(|_| AttemptError {
                error: self.cancelled(url),
                retryable: false,
            })?,
        };

        tracing::trace!("GET {} (attempt {})", url, attempt);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_transport_error(url, &e, attempt))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptError {
                error: FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                    attempts: attempt,
                },
                retryable: is_retryable_status(status),
            });
        }

        response
            .text()
            .await
            .map_err(|e| classify_transport_error(url, &e, attempt))
    }

    fn cancelled(&self, url: &Url) -> FetchError {
        FetchError::Cancelled {
            url: url.to_string(),
        }
    }
}

/// Builds an HTTP client with the configured user agent and timeout
pub fn build_http_client(config: &FetchConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .gzip(true)
        .brotli(true)
        .build()
}

fn is_retryable_status(status: StatusCode) -> bool {
    status.is_server_error()
}

fn classify_transport_error(url: &Url, error: &reqwest::Error, attempts: u32) -> AttemptError {
    let error = if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            attempts,
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: error.to_string(),
            attempts,
        }
    };

    AttemptError {
        error,
        retryable: true,
    }
}

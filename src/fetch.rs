use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::time::Duration;

use crate::config::Config;
use crate::error::Result;

/// Raw outcome of one GET attempt, before retry/terminal classification.
///
/// An explicit tagged union instead of exception-style control flow: the
/// retry policy consumes this value and decides what happens next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// An HTTP response was received; only the status is consulted
    Status(u16),
    /// The attempt exceeded the per-request timeout
    Timeout,
    /// DNS/TCP/TLS-level failure before any response
    Connection(String),
    /// Anything else (invalid request, protocol error, ...)
    Other(String),
}

/// One outbound GET attempt for one URL.
///
/// Trait seam so the dispatcher and retry loop can be exercised with stub
/// fetchers in tests without touching the network.
#[async_trait]
pub trait FetchUrl: Send + Sync {
    async fn attempt(&self, url: &str) -> FetchOutcome;
}

/// Production fetch worker backed by a shared pooled reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Build the HTTP client from configuration. The client is cheap to
    /// clone and shares one connection pool across all tasks.
    pub fn from_config(config: &Config) -> Result<Self> {
        let user_agent = config.user_agent.as_deref().unwrap_or(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));

        let concurrency = config.concurrency_limit();

        let client = reqwest::Client::builder()
            .timeout(config.timeout_duration())
            .redirect(Policy::limited(10))
            .user_agent(user_agent)
            .pool_max_idle_per_host(concurrency.min(20))
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FetchUrl for HttpFetcher {
    async fn attempt(&self, url: &str) -> FetchOutcome {
        match self.client.get(url).send().await {
            Ok(response) => FetchOutcome::Status(response.status().as_u16()),
            Err(err) => classify_request_error(&err),
        }
    }
}

/// Map a transport error onto the raw-outcome taxonomy. Timeout wins over
/// connect: a connect that timed out is still a timeout to the caller.
fn classify_request_error(err: &reqwest::Error) -> FetchOutcome {
    if err.is_timeout() {
        FetchOutcome::Timeout
    } else if err.is_connect() {
        FetchOutcome::Connection(describe_error(err))
    } else {
        FetchOutcome::Other(describe_error(err))
    }
}

/// Prefer the underlying source over reqwest's outer wrapper, which only
/// says "error sending request".
fn describe_error(err: &reqwest::Error) -> String {
    std::error::Error::source(err)
        .map(|e| e.to_string())
        .unwrap_or_else(|| err.to_string())
}

//! urlprobe checks reachability of a batch of URLs.
//!
//! URLs are read from a CSV file, fetched concurrently under a configurable
//! concurrency ceiling, retried on transient failures (429/503, timeouts,
//! connection errors) with a fixed delay, and written back out as one
//! result row per input URL.

pub mod batch;
pub mod config;
pub mod error;
pub mod fetch;
pub mod input;
pub mod logging;
pub mod output;
pub mod progress;
pub mod retry;
pub mod types;
pub mod validator;

pub use batch::{BatchDispatcher, CancelHandle};
pub use config::{CliConfig, Config};
pub use error::{Result, UrlProbeError};
pub use fetch::{FetchOutcome, FetchUrl, HttpFetcher};
pub use retry::{Attempt, RetryPolicy, Verdict};
pub use types::{Outcome, ResultRecord, UrlTask};

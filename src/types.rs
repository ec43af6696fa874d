use std::cmp::Ordering;
use std::fmt;

/// One input URL's end-to-end processing unit.
///
/// Carries the raw URL string exactly as read from input plus its ordinal
/// position, used to re-associate results with input order after the
/// non-deterministic completion of concurrent tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTask {
    /// The URL as read from input, unmodified
    pub url: String,
    /// Ordinal position in the input (0-indexed)
    pub index: usize,
}

impl UrlTask {
    pub fn new(url: impl Into<String>, index: usize) -> Self {
        Self {
            url: url.into(),
            index,
        }
    }
}

/// Terminal outcome category for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// An HTTP response outside the retryable set was received. The status
    /// may be non-2xx; the tool reports reachability, not application-level
    /// success.
    Ok(u16),
    /// Every attempt returned a retryable status; carries the last one seen
    RetryableExhausted(u16),
    /// Every attempt timed out
    Timeout,
    /// Every attempt failed at the DNS/TCP/TLS level
    ConnectionError,
    /// The URL failed syntactic validation; no request was ever made
    InvalidUrl,
    /// An unclassified failure, never retried
    UnknownError,
}

impl Outcome {
    /// Value of the first output column: the numeric status where one
    /// exists, otherwise a literal tag.
    pub fn code_or_error(&self) -> String {
        match self {
            Outcome::Ok(status) | Outcome::RetryableExhausted(status) => status.to_string(),
            Outcome::Timeout => "TIMEOUT".to_string(),
            Outcome::ConnectionError => "CONNECTION_ERROR".to_string(),
            Outcome::InvalidUrl => "INVALID_URL".to_string(),
            Outcome::UnknownError => "ERROR".to_string(),
        }
    }

    /// Category name, used in the summary and JSON output
    pub fn category(&self) -> &'static str {
        match self {
            Outcome::Ok(_) => "OK",
            Outcome::RetryableExhausted(_) => "RETRYABLE_EXHAUSTED",
            Outcome::Timeout => "TIMEOUT",
            Outcome::ConnectionError => "CONNECTION_ERROR",
            Outcome::InvalidUrl => "INVALID_URL",
            Outcome::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

/// Final per-URL record handed to the output collaborator.
///
/// Exactly one is produced per `UrlTask`, created at the terminal point of
/// the task's processing and immutable thereafter.
#[derive(Debug, Clone, Eq)]
pub struct ResultRecord {
    /// The URL this record describes
    pub url: String,
    /// Ordinal position of the originating task
    pub index: usize,
    /// Terminal outcome category
    pub outcome: Outcome,
    /// Short failure description; empty for `Ok`
    pub detail: String,
}

impl ResultRecord {
    /// Record for an HTTP response outside the retryable set
    pub fn ok(task: &UrlTask, status: u16) -> Self {
        Self {
            url: task.url.clone(),
            index: task.index,
            outcome: Outcome::Ok(status),
            detail: String::new(),
        }
    }

    /// Record for any terminal failure; detail must describe the failure
    pub fn failure(task: &UrlTask, outcome: Outcome, detail: String) -> Self {
        debug_assert!(!matches!(outcome, Outcome::Ok(_)));
        Self {
            url: task.url.clone(),
            index: task.index,
            outcome,
            detail,
        }
    }

    /// Whether this record carries an HTTP status on first classification
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Outcome::Ok(_))
    }

    pub fn is_not_ok(&self) -> bool {
        !self.is_ok()
    }
}

impl Ord for ResultRecord {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index.cmp(&other.index)
    }
}

impl PartialOrd for ResultRecord {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ResultRecord {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url && self.outcome == other.outcome && self.detail == other.detail
    }
}

// Reads as the console line printed per finished URL: "(code) url", with the
// detail appended for failures.
impl fmt::Display for ResultRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.detail.is_empty() {
            write!(f, "({}) {}", self.outcome.code_or_error(), self.url)
        } else {
            write!(
                f,
                "({}) {} | {}",
                self.outcome.code_or_error(),
                self.url,
                self.detail
            )
        }
    }
}

use std::fmt;

/// Error types for urlprobe operations.
///
/// Only batch-level failures surface through this type: inability to read
/// input, load configuration, or write output. Per-URL failures never reach
/// here; they are converted into terminal `ResultRecord`s inside the batch.
#[derive(Debug)]
pub enum UrlProbeError {
    /// IO error (file operations, etc.)
    Io(std::io::Error),

    /// Configuration error
    Config(String),

    /// CSV reading/writing error
    Csv(csv::Error),

    /// HTTP client construction error
    Http(reqwest::Error),

    /// TOML parsing error
    TomlParsing(toml::de::Error),

    /// JSON serialization error
    Json(serde_json::Error),

    /// File not found error
    FileNotFound(String),

    /// Invalid argument error
    InvalidArgument(String),
}

impl fmt::Display for UrlProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlProbeError::Io(err) => write!(f, "IO error: {err}"),
            UrlProbeError::Config(msg) => write!(f, "Configuration error: {msg}"),
            UrlProbeError::Csv(err) => write!(f, "CSV error: {err}"),
            UrlProbeError::Http(err) => write!(f, "HTTP error: {err}"),
            UrlProbeError::TomlParsing(err) => write!(f, "TOML parsing error: {err}"),
            UrlProbeError::Json(err) => write!(f, "JSON error: {err}"),
            UrlProbeError::FileNotFound(path) => write!(f, "File not found: {path}"),
            UrlProbeError::InvalidArgument(msg) => write!(f, "Invalid argument: {msg}"),
        }
    }
}

impl std::error::Error for UrlProbeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            UrlProbeError::Io(err) => Some(err),
            UrlProbeError::Csv(err) => Some(err),
            UrlProbeError::Http(err) => Some(err),
            UrlProbeError::TomlParsing(err) => Some(err),
            UrlProbeError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for UrlProbeError {
    fn from(err: std::io::Error) -> Self {
        UrlProbeError::Io(err)
    }
}

impl From<csv::Error> for UrlProbeError {
    fn from(err: csv::Error) -> Self {
        UrlProbeError::Csv(err)
    }
}

impl From<reqwest::Error> for UrlProbeError {
    fn from(err: reqwest::Error) -> Self {
        UrlProbeError::Http(err)
    }
}

impl From<toml::de::Error> for UrlProbeError {
    fn from(err: toml::de::Error) -> Self {
        UrlProbeError::TomlParsing(err)
    }
}

impl From<serde_json::Error> for UrlProbeError {
    fn from(err: serde_json::Error) -> Self {
        UrlProbeError::Json(err)
    }
}

/// Type alias for Results using UrlProbeError
pub type Result<T> = std::result::Result<T, UrlProbeError>;

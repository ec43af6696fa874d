use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::error::{Result, UrlProbeError};

/// Default concurrency ceiling for in-flight attempts
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default per-attempt timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Default number of retries after the initial attempt
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Default fixed delay between retries in milliseconds
pub const DEFAULT_RETRY_DELAY_MS: u64 = 2000;

/// HTTP status codes retried by default (rate limiting, service unavailable)
pub const DEFAULT_RETRYABLE_STATUS_CODES: [u16; 2] = [429, 503];

/// Configuration value object consumed by the batch dispatcher.
///
/// All fields are optional so that a TOML file only needs to name the values
/// it overrides; accessors fall back to the documented defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timeout in seconds for each HTTP attempt
    pub timeout: Option<u64>,

    /// Maximum number of concurrent in-flight attempts
    pub concurrency: Option<usize>,

    /// Retry attempts after the initial request (0 disables retries)
    pub max_retries: Option<u8>,

    /// Fixed delay between retries in milliseconds
    pub retry_delay: Option<u64>,

    /// HTTP status codes that trigger a retry instead of a terminal result
    pub retryable_status_codes: Option<Vec<u16>>,

    /// Custom User-Agent header
    pub user_agent: Option<String>,

    /// Output format (csv, json)
    pub output_format: Option<String>,

    /// Enable verbose logging
    pub verbose: Option<bool>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT_SECONDS),
            concurrency: Some(DEFAULT_CONCURRENCY),
            max_retries: Some(DEFAULT_MAX_RETRIES),
            retry_delay: Some(DEFAULT_RETRY_DELAY_MS),
            retryable_status_codes: Some(DEFAULT_RETRYABLE_STATUS_CODES.to_vec()),
            user_agent: None,
            output_format: Some("csv".to_string()),
            verbose: Some(false),
        }
    }
}

impl Config {
    /// Load configuration from file, falling back to defaults
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to find and load a config file in standard locations
    pub fn load_from_standard_locations() -> Self {
        // Check for .urlprobe.toml in current directory
        if let Ok(config) = Self::load_from_file(".urlprobe.toml") {
            return config;
        }

        // Check for .urlprobe.toml in parent directories (up to 3 levels)
        for i in 1..=3 {
            let path = format!("{}.urlprobe.toml", "../".repeat(i));
            if let Ok(config) = Self::load_from_file(&path) {
                return config;
            }
        }

        // Fall back to defaults
        Self::default()
    }

    /// Merge this config with CLI arguments (CLI takes precedence)
    pub fn merge_with_cli(&mut self, cli_config: &CliConfig) {
        if let Some(timeout) = cli_config.timeout {
            self.timeout = Some(timeout);
        }
        if let Some(concurrency) = cli_config.concurrency {
            self.concurrency = Some(concurrency);
        }
        if let Some(max_retries) = cli_config.max_retries {
            self.max_retries = Some(max_retries);
        }
        if let Some(retry_delay) = cli_config.retry_delay {
            self.retry_delay = Some(retry_delay);
        }
        if let Some(ref codes) = cli_config.retryable_status_codes {
            self.retryable_status_codes = Some(codes.clone());
        }
        if let Some(ref user_agent) = cli_config.user_agent {
            self.user_agent = Some(user_agent.clone());
        }
        if let Some(ref output_format) = cli_config.output_format {
            self.output_format = Some(output_format.clone());
        }
        if cli_config.verbose {
            self.verbose = Some(true);
        }
    }

    /// Validate value constraints before the batch starts
    pub fn validate(&self) -> Result<()> {
        if self.concurrency == Some(0) {
            return Err(UrlProbeError::InvalidArgument(
                "concurrency must be at least 1".to_string(),
            ));
        }
        if self.timeout == Some(0) {
            return Err(UrlProbeError::InvalidArgument(
                "timeout must be greater than 0 seconds".to_string(),
            ));
        }
        for &code in self.retryable_status_codes.as_deref().unwrap_or(&[]) {
            if !(100..=599).contains(&code) {
                return Err(UrlProbeError::InvalidArgument(format!(
                    "retryable status code {code} is not a valid HTTP status code (100-599)"
                )));
            }
        }
        Ok(())
    }

    /// Get per-attempt timeout as Duration
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout.unwrap_or(DEFAULT_TIMEOUT_SECONDS))
    }

    /// Get retry delay as Duration
    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_millis(self.retry_delay.unwrap_or(DEFAULT_RETRY_DELAY_MS))
    }

    /// Get concurrency ceiling, at least 1
    pub fn concurrency_limit(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }

    /// Get retry attempt count
    pub fn max_retries_count(&self) -> u8 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    /// Get retryable status codes as a set
    pub fn retryable_status_set(&self) -> HashSet<u16> {
        self.retryable_status_codes
            .clone()
            .unwrap_or_else(|| DEFAULT_RETRYABLE_STATUS_CODES.to_vec())
            .into_iter()
            .collect()
    }
}

/// Configuration options that can come from CLI
#[derive(Debug, Default)]
pub struct CliConfig {
    pub timeout: Option<u64>,
    pub concurrency: Option<usize>,
    pub max_retries: Option<u8>,
    pub retry_delay: Option<u64>,
    pub retryable_status_codes: Option<Vec<u16>>,
    pub user_agent: Option<String>,
    pub output_format: Option<String>,
    pub verbose: bool,
    pub quiet: bool,
    pub no_progress: bool,
    pub no_config: bool,
    pub config_file: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.timeout, Some(5));
        assert_eq!(config.concurrency, Some(10));
        assert_eq!(config.max_retries, Some(3));
        assert_eq!(config.retry_delay, Some(2000));
        assert_eq!(config.retryable_status_codes, Some(vec![429, 503]));
        assert_eq!(config.output_format, Some("csv".to_string()));
    }

    #[test]
    fn test_config_load_from_file() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            b"timeout = 60\nconcurrency = 4\nmax_retries = 1\nuser_agent = \"test-agent\"",
        )?;

        let config = Config::load_from_file(file.path())?;
        assert_eq!(config.timeout, Some(60));
        assert_eq!(config.concurrency, Some(4));
        assert_eq!(config.max_retries, Some(1));
        assert_eq!(config.user_agent, Some("test-agent".to_string()));

        Ok(())
    }

    #[test]
    fn test_config_merge_with_cli() {
        let mut config = Config::default();
        let cli_config = CliConfig {
            timeout: Some(45),
            concurrency: Some(2),
            retryable_status_codes: Some(vec![429, 500, 503]),
            verbose: true,
            ..Default::default()
        };

        config.merge_with_cli(&cli_config);

        assert_eq!(config.timeout, Some(45));
        assert_eq!(config.concurrency, Some(2));
        assert_eq!(config.retryable_status_codes, Some(vec![429, 500, 503]));
        assert_eq!(config.verbose, Some(true));
        // Untouched CLI fields keep file/default values
        assert_eq!(config.max_retries, Some(3));
    }

    #[test]
    fn test_config_validate__rejects_zero_concurrency() {
        let config = Config {
            concurrency: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate__rejects_zero_timeout() {
        let config = Config {
            timeout: Some(0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validate__rejects_bogus_status_code() {
        let config = Config {
            retryable_status_codes: Some(vec![429, 999]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_durations() {
        let config = Config {
            timeout: Some(7),
            retry_delay: Some(250),
            ..Default::default()
        };
        assert_eq!(config.timeout_duration(), Duration::from_secs(7));
        assert_eq!(config.retry_delay_duration(), Duration::from_millis(250));
    }

    #[test]
    fn test_config_retryable_status_set() {
        let config = Config::default();
        let set = config.retryable_status_set();
        assert!(set.contains(&429));
        assert!(set.contains(&503));
        assert!(!set.contains(&500));
    }

    #[test]
    fn test_config_concurrency_limit_floor() {
        let config = Config {
            concurrency: None,
            ..Default::default()
        };
        assert_eq!(config.concurrency_limit(), DEFAULT_CONCURRENCY);
    }
}

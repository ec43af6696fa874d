use log::{debug, error, info, warn};

use crate::config::Config;

/// Initialize the logger with appropriate level based on verbosity
pub fn init_logger(verbose: bool, quiet: bool) {
    let level = if quiet {
        log::LevelFilter::Off
    } else if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Off // Only show structured logs in verbose mode
    };

    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false)
        .init();

    debug!("Logger initialized with level: {level:?}");
}

/// Log configuration information
pub fn log_config_info(config: &Config) {
    let timeout = config.timeout_duration().as_secs();
    let concurrency = config.concurrency_limit();
    let max_retries = config.max_retries_count();
    let retry_delay = config.retry_delay_duration().as_millis();
    let mut retryable: Vec<u16> = config.retryable_status_set().into_iter().collect();
    retryable.sort_unstable();

    info!("Configuration: concurrency={concurrency}, timeout={timeout}s");
    info!("Retry: attempts={max_retries}, delay={retry_delay}ms, statuses={retryable:?}");
}

/// Log batch start
pub fn log_batch_start(url_count: usize) {
    info!("Starting reachability check of {url_count} URL(s)");
}

/// Log batch completion
pub fn log_batch_complete(url_count: usize, unreachable: usize, duration_ms: u128) {
    if unreachable == 0 {
        info!(
            "Batch complete: {}/{} URLs reachable ({}ms)",
            url_count - unreachable,
            url_count,
            duration_ms
        );
    } else {
        warn!(
            "Batch complete: {}/{} URLs reachable, {} failures ({}ms)",
            url_count - unreachable,
            url_count,
            unreachable,
            duration_ms
        );
    }
}

/// Log error information
pub fn log_error(message: &str, source: Option<&dyn std::error::Error>) {
    match source {
        Some(err) => error!("{message}: {err}"),
        None => error!("{message}"),
    }
}

/// Log warning information
pub fn log_warning(message: &str) {
    warn!("{message}");
}

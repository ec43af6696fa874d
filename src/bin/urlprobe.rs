use clap::Parser;
use std::time::Instant;

use urlprobe::batch::BatchDispatcher;
use urlprobe::config::{CliConfig, Config};
use urlprobe::error::{Result, UrlProbeError};
use urlprobe::output::{Summary, formats, write_records};
use urlprobe::progress::ProgressReporter;
use urlprobe::{input, logging};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV file with URLs to check (header row skipped, first column used)
    pub input: String,

    // Core Options
    /// File to write results to
    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        default_value = "output_status.csv",
        help_heading = "Core Options"
    )]
    pub output: String,

    /// Per-attempt timeout in seconds (default: 5)
    #[arg(short = 't', long, value_name = "SECONDS", help_heading = "Core Options")]
    pub timeout: Option<u64>,

    /// Maximum concurrent requests (default: 10)
    #[arg(long, value_name = "COUNT", help_heading = "Core Options")]
    pub concurrency: Option<usize>,

    // Retry
    /// Retry attempts after the initial request (default: 3)
    #[arg(long, value_name = "COUNT", help_heading = "Retry")]
    pub retry: Option<u8>,

    /// Delay between retries in ms (default: 2000)
    #[arg(long, value_name = "MS", help_heading = "Retry")]
    pub retry_delay: Option<u64>,

    /// Status codes to retry, comma-separated (default: 429,503)
    #[arg(long, value_name = "CODES", help_heading = "Retry")]
    pub retry_status: Option<String>,

    // Network
    /// Custom User-Agent header
    #[arg(long, value_name = "AGENT", help_heading = "Network")]
    pub user_agent: Option<String>,

    // Output & Verbosity
    /// Suppress progress and summary output
    #[arg(short = 'q', long, help_heading = "Output & Verbosity")]
    pub quiet: bool,

    /// Enable verbose logging
    #[arg(short = 'v', long, help_heading = "Output & Verbosity")]
    pub verbose: bool,

    /// Output format
    #[arg(long, value_name = "FORMAT", value_parser = formats::ALL, help_heading = "Output & Verbosity")]
    pub format: Option<String>,

    /// Disable progress bar
    #[arg(long, help_heading = "Output & Verbosity")]
    pub no_progress: bool,

    // Configuration
    /// Use specific config file
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Ignore config files
    #[arg(long, help_heading = "Configuration")]
    pub no_config: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    match run(&cli).await {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: &Cli) -> Result<i32> {
    let cli_config = cli_to_config(cli)?;
    let config = load_and_merge_config(&cli_config)?;
    config.validate()?;

    logging::init_logger(config.verbose.unwrap_or(false), cli_config.quiet);
    logging::log_config_info(&config);

    let urls = input::read_urls(&cli.input)?;
    let total = urls.len();
    logging::log_batch_start(total);

    let mut progress = ProgressReporter::new(!cli_config.quiet && !cli_config.no_progress);
    progress.start_batch(total);

    let dispatcher = BatchDispatcher::from_config(&config)?;

    // Propagate Ctrl-C as best-effort batch cancellation
    let cancel = dispatcher.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logging::log_warning("Interrupt received, cancelling in-flight checks");
            cancel.cancel();
        }
    });

    let start = Instant::now();
    let records = dispatcher.run(urls, Some(&progress)).await;
    let duration_ms = start.elapsed().as_millis();

    let summary = Summary::from_records(&records);
    progress.finish_batch(summary.ok, records.len());
    progress.finish_and_clear();
    logging::log_batch_complete(records.len(), records.len() - summary.ok, duration_ms);

    let format = config
        .output_format
        .as_deref()
        .unwrap_or(formats::DEFAULT)
        .to_string();
    write_records(&cli.output, &records, &format)?;

    if !cli_config.quiet {
        print!("{}", summary.render());
        println!("\nResults written to {}", cli.output);
    }

    // Cancellation leaves some URLs without a record; flag the incomplete
    // coverage to the caller
    if records.len() < total {
        eprintln!(
            "Warning: batch interrupted, {} of {} URL(s) not checked",
            total - records.len(),
            total
        );
        return Ok(130);
    }

    Ok(0)
}

/// Map parsed CLI flags onto the config-merge structure
fn cli_to_config(cli: &Cli) -> Result<CliConfig> {
    let retryable_status_codes = cli
        .retry_status
        .as_deref()
        .map(parse_status_codes)
        .transpose()?;

    Ok(CliConfig {
        timeout: cli.timeout,
        concurrency: cli.concurrency,
        max_retries: cli.retry,
        retry_delay: cli.retry_delay,
        retryable_status_codes,
        user_agent: cli.user_agent.clone(),
        output_format: cli.format.clone(),
        verbose: cli.verbose,
        quiet: cli.quiet,
        no_progress: cli.no_progress,
        no_config: cli.no_config,
        config_file: cli.config.clone(),
    })
}

fn parse_status_codes(list: &str) -> Result<Vec<u16>> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u16>().map_err(|_| {
                UrlProbeError::InvalidArgument(format!(
                    "status code '{s}' is not a valid HTTP status code"
                ))
            })
        })
        .collect()
}

/// Load configuration from file or standard locations and merge with CLI
/// config (CLI takes precedence)
fn load_and_merge_config(cli_config: &CliConfig) -> Result<Config> {
    let mut config = if cli_config.no_config {
        Config::default()
    } else if let Some(ref config_file) = cli_config.config_file {
        Config::load_from_file(config_file).inspect_err(|e| {
            logging::log_error(&format!("Could not load config file '{config_file}'"), Some(e));
        })?
    } else {
        Config::load_from_standard_locations()
    };

    config.merge_with_cli(cli_config);
    Ok(config)
}

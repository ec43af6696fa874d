use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, UrlProbeError};
use crate::types::ResultRecord;

/// Output formats supported for the result file
pub mod formats {
    pub const CSV: &str = "csv";
    pub const JSON: &str = "json";
    pub const ALL: [&str; 2] = [CSV, JSON];
    pub const DEFAULT: &str = CSV;
}

const CSV_HEADER: [&str; 3] = ["Status Code or Error", "URL", "Detail"];

/// Shape of one record in JSON output
#[derive(Debug, Serialize)]
struct JsonRecord<'a> {
    status: String,
    category: &'static str,
    url: &'a str,
    detail: &'a str,
}

impl<'a> From<&'a ResultRecord> for JsonRecord<'a> {
    fn from(record: &'a ResultRecord) -> Self {
        Self {
            status: record.outcome.code_or_error(),
            category: record.outcome.category(),
            url: &record.url,
            detail: &record.detail,
        }
    }
}

/// Write records to a CSV file in the shape `outcome_code_or_error, url,
/// detail`, one row per input URL, preceded by a header row.
pub fn write_csv<P: AsRef<Path>>(path: P, records: &[ResultRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.outcome.code_or_error().as_str(),
            record.url.as_str(),
            record.detail.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records as a JSON array
pub fn write_json<P: AsRef<Path>>(path: P, records: &[ResultRecord]) -> Result<()> {
    let shaped: Vec<JsonRecord> = records.iter().map(JsonRecord::from).collect();
    let mut file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(&mut file, &shaped)?;
    file.write_all(b"\n")?;
    Ok(())
}

/// Write records in the requested format
pub fn write_records<P: AsRef<Path>>(
    path: P,
    records: &[ResultRecord],
    format: &str,
) -> Result<()> {
    match format {
        formats::CSV => write_csv(path, records),
        formats::JSON => write_json(path, records),
        other => Err(UrlProbeError::InvalidArgument(format!(
            "unknown output format: {other}"
        ))),
    }
}

/// Per-category counts for the end-of-run summary
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub ok: usize,
    pub retryable_exhausted: usize,
    pub timeout: usize,
    pub connection_error: usize,
    pub invalid_url: usize,
    pub unknown_error: usize,
}

impl Summary {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        use crate::types::Outcome::*;

        let mut summary = Self {
            total: records.len(),
            ..Default::default()
        };
        for record in records {
            match record.outcome {
                Ok(_) => summary.ok += 1,
                RetryableExhausted(_) => summary.retryable_exhausted += 1,
                Timeout => summary.timeout += 1,
                ConnectionError => summary.connection_error += 1,
                InvalidUrl => summary.invalid_url += 1,
                UnknownError => summary.unknown_error += 1,
            }
        }
        summary
    }

    /// Render the summary block printed after the batch
    pub fn render(&self) -> String {
        let mut out = format!("\n> Checked {} URL(s)\n", self.total);
        let lines = [
            ("reachable (status received)", self.ok),
            ("retries exhausted", self.retryable_exhausted),
            ("timed out", self.timeout),
            ("connection failed", self.connection_error),
            ("invalid URL", self.invalid_url),
            ("unclassified error", self.unknown_error),
        ];
        for (label, count) in lines {
            if count > 0 {
                out.push_str(&format!("{count:4} {label}\n"));
            }
        }
        out
    }
}

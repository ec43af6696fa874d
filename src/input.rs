use std::path::Path;

use crate::error::{Result, UrlProbeError};

/// Read URLs from a delimited input file: the header row is skipped, the
/// URL is taken from the first column, and blank rows are dropped. The
/// surrounding columns are not interpreted.
pub fn read_urls<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(UrlProbeError::FileNotFound(path.display().to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let mut urls = Vec::new();
    for record in reader.records() {
        let record = record?;
        if let Some(field) = record.get(0) {
            let url = field.trim();
            if !url.is_empty() {
                urls.push(url.to_string());
            }
        }
    }

    Ok(urls)
}

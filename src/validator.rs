use url::Url;

/// Syntactic URL validation performed before any network I/O.
///
/// A URL that fails here is classified immediately and deterministically:
/// it never consumes a concurrency permit and never enters the retry loop.
/// Validity requires a parseable URL, an `http` or `https` scheme, and a
/// non-empty host component.
pub fn validate_url(candidate: &str) -> Result<(), String> {
    let trimmed = candidate.trim();
    if trimmed.is_empty() {
        return Err("empty URL".to_string());
    }

    let parsed = Url::parse(trimmed).map_err(|e| format!("malformed URL: {e}"))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme: {other}")),
    }

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err("missing host".to_string()),
    }
}

//! Error types for the extraction pipeline.
//!
//! Every variant is recoverable from the orchestrator's point of view: a
//! strategy that fails with any of these simply yields no result and the next
//! strategy is tried. Only configuration errors ever reach the binary.

use thiserror::Error;

/// Errors raised inside the fetcher, the strategies and the config loader.
///
/// Payloads are plain strings so the error can be cloned and replayed when a
/// cached page download is shared between strategies.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("could not parse content: {0}")]
    Parse(String),

    #[error("no browser could be started: {0}")]
    BrowserUnavailable(String),

    #[error("browser error: {0}")]
    Browser(String),

    #[error("timed out after {millis}ms waiting for {what}")]
    Timeout { what: String, millis: u128 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl ExtractError {
    pub(crate) fn fetch(url: &str, err: impl std::fmt::Display) -> Self {
        ExtractError::Fetch {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn browser(err: impl std::fmt::Display) -> Self {
        ExtractError::Browser(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExtractError {
    fn from(err: serde_yaml::Error) -> Self {
        ExtractError::Config(err.to_string())
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let err = ExtractError::Status {
            url: "https://example.com/a".to_string(),
            status: 403,
        };
        assert_eq!(err.to_string(), "https://example.com/a answered with HTTP 403");
    }

    #[test]
    fn test_yaml_error_maps_to_config() {
        let parsed: Result<Vec<u32>, _> = serde_yaml::from_str("{not: [a list");
        let err: ExtractError = parsed.unwrap_err().into();
        assert!(matches!(err, ExtractError::Config(_)));
    }
}

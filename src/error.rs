//! Error types for keiba-fetch
//!
//! Every pipeline stage converts its fault into exactly one variant here at
//! the stage boundary where the fault occurs — no error crosses a stage
//! unconverted, and the public fetch entry point turns the final `Err` into
//! a failure outcome. There is deliberately no encoding variant: the decode
//! stage resolves through a fallback chain and cannot fail.

use thiserror::Error;

/// Result type alias for keiba-fetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for keiba-fetch
///
/// Each variant corresponds to one stage of the fetch pipeline. The message
/// carries the underlying library error where one exists.
#[derive(Debug, Error)]
pub enum Error {
    /// Request construction or transport failure: malformed URL, unsupported
    /// scheme, DNS/connect/TLS failure, or a non-2xx response status
    #[error("request error: {0}")]
    Request(String),

    /// The response body does not match its declared content-encoding
    #[error("compression error: {0}")]
    Compression(String),

    /// Mid-transfer read failure on the response body stream
    #[error("stream error: {0}")]
    Stream(String),

    /// Destination directory creation or text write failure
    #[error("storage error: {0}")]
    Storage(String),

    /// The configured duration elapsed before the pipeline reached a
    /// terminal state; the in-flight request was aborted
    #[error("timeout error: no response within {0} ms")]
    Timeout(u64),

    /// Configuration error with context about which setting is invalid
    ///
    /// Raised at fetcher construction only — a running fetch never produces
    /// this classification.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "timeout_millis")
        key: Option<String>,
    },
}

impl Error {
    /// Machine-readable classification for this error
    ///
    /// These codes are stable; failure outcomes carry them so callers can
    /// branch on the classification instead of parsing messages.
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Request(_) => "request_error",
            Error::Compression(_) => "compression_error",
            Error::Stream(_) => "stream_error",
            Error::Storage(_) => "storage_error",
            Error::Timeout(_) => "timeout_error",
            Error::Config { .. } => "config_error",
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    /// Returns (Error, expected_error_code) for every variant.
    fn all_error_variants() -> Vec<(Error, &'static str)> {
        vec![
            (
                Error::Request("connection refused".into()),
                "request_error",
            ),
            (
                Error::Compression("invalid gzip header".into()),
                "compression_error",
            ),
            (Error::Stream("connection reset".into()), "stream_error"),
            (Error::Storage("permission denied".into()), "storage_error"),
            (Error::Timeout(30_000), "timeout_error"),
            (
                Error::Config {
                    message: "timeout_millis must be greater than zero".into(),
                    key: Some("timeout_millis".into()),
                },
                "config_error",
            ),
        ]
    }

    #[test]
    fn every_variant_maps_to_expected_error_code() {
        for (error, expected_code) in all_error_variants() {
            let actual_code = error.error_code();
            assert_eq!(
                actual_code, expected_code,
                "Error {error:?} returned code {actual_code}, expected {expected_code}"
            );
        }
    }

    #[test]
    fn timeout_message_includes_configured_duration() {
        let err = Error::Timeout(5_000);
        assert!(
            err.to_string().contains("5000 ms"),
            "timeout message should carry the configured duration: {err}"
        );
    }

    #[test]
    fn request_message_includes_underlying_detail() {
        let err = Error::Request("dns lookup failed for race.example.jp".into());
        let msg = err.to_string();
        assert!(msg.starts_with("request error: "));
        assert!(msg.contains("race.example.jp"));
    }

    #[test]
    fn config_message_does_not_leak_key_into_display() {
        let err = Error::Config {
            message: "destination path is empty".into(),
            key: Some("destination".into()),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: destination path is empty"
        );
    }
}

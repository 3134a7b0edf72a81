//! Core types for keiba-fetch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Character encoding a response body was decoded with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextEncoding {
    /// Shift-JIS
    #[serde(rename = "shift_jis")]
    ShiftJis,
    /// UTF-8
    #[serde(rename = "utf-8")]
    Utf8,
    /// EUC-JP
    #[serde(rename = "euc-jp")]
    EucJp,
}

impl TextEncoding {
    /// Parse a requested encoding identifier, case-insensitively
    ///
    /// Recognized identifiers: `shift_jis` / `shift-jis`, `utf-8` / `utf8`,
    /// `euc-jp`. Returns `None` for anything else — the resolver then enters
    /// the fallback chain directly.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "shift_jis" | "shift-jis" => Some(TextEncoding::ShiftJis),
            "utf-8" | "utf8" => Some(TextEncoding::Utf8),
            "euc-jp" => Some(TextEncoding::EucJp),
            _ => None,
        }
    }

    /// Canonical label for this encoding
    pub fn as_str(&self) -> &'static str {
        match self {
            TextEncoding::ShiftJis => "shift_jis",
            TextEncoding::Utf8 => "utf-8",
            TextEncoding::EucJp => "euc-jp",
        }
    }
}

impl std::fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline stage, used in events and structured log fields
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Request construction and dispatch
    Request,
    /// Content-encoding stream wrapping
    Decompress,
    /// Body drain into the accumulation buffer
    Accumulate,
    /// Byte-to-text conversion
    Decode,
    /// Optional write to the storage destination
    Persist,
}

/// Text produced by the encoding resolver, with decode metadata
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedContent {
    /// The decoded page text
    pub text: String,
    /// Length in bytes of the (decompressed) body before decoding
    pub byte_len: usize,
    /// Encoding that actually produced the text (may be a fallback, not the
    /// requested one)
    pub encoding_used: TextEncoding,
}

/// The single terminal result of one fetch request
///
/// Exactly one outcome is produced per [`fetch`](crate::PageFetcher::fetch)
/// call. A success always carries the decoded text; a failure never does —
/// the enum shape enforces the invariant rather than convention.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Every stage completed without fault
    Success {
        /// Decoded page text
        text: String,
        /// Body length in bytes before decoding
        byte_len: usize,
        /// Response `Content-Type` header, if the server sent one
        content_type: Option<String>,
        /// Encoding that produced the text (may differ from the request)
        encoding_used: TextEncoding,
        /// Where the text was persisted, when a destination was configured
        #[serde(skip_serializing_if = "Option::is_none")]
        stored_to: Option<PathBuf>,
    },
    /// A stage faulted; the pipeline stopped at that boundary
    Failure {
        /// Machine-readable error classification (see
        /// [`Error::error_code`](crate::Error::error_code))
        code: String,
        /// Human-readable error message
        message: String,
    },
}

impl FetchOutcome {
    /// Build the failure outcome for a pipeline error
    pub(crate) fn failure(err: &crate::error::Error) -> Self {
        FetchOutcome::Failure {
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }

    /// Whether the fetch reached `Done` rather than `Failed`
    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Success { .. })
    }

    /// Decoded text, present on success only
    pub fn text(&self) -> Option<&str> {
        match self {
            FetchOutcome::Success { text, .. } => Some(text),
            FetchOutcome::Failure { .. } => None,
        }
    }
}

/// Event emitted at each pipeline stage transition
///
/// The event hook is optional observability: with no subscribers, events are
/// dropped silently and the fetch proceeds unaffected. The core contract
/// never depends on anyone listening.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    /// Resource locator validated and the GET dispatched
    Requesting {
        /// Target URL
        url: String,
    },

    /// Response headers arrived; body streaming begins
    HeadersReceived {
        /// HTTP status code
        status: u16,
        /// `Content-Type` header, if present
        content_type: Option<String>,
        /// `Content-Encoding` header, if present
        content_encoding: Option<String>,
    },

    /// Body fully drained and decompressed
    BodyComplete {
        /// Decompressed body length in bytes
        byte_len: usize,
    },

    /// Byte buffer converted to text
    Decoded {
        /// Encoding that produced the text
        encoding_used: TextEncoding,
    },

    /// Text written to the configured destination
    Stored {
        /// Final storage location
        path: PathBuf,
    },

    /// Terminal success
    Completed {
        /// Body length in bytes
        byte_len: usize,
    },

    /// Terminal failure
    Failed {
        /// Machine-readable error classification
        code: String,
        /// Error message
        message: String,
    },
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_parse_accepts_recognized_aliases_case_insensitively() {
        assert_eq!(TextEncoding::parse("shift_jis"), Some(TextEncoding::ShiftJis));
        assert_eq!(TextEncoding::parse("Shift-JIS"), Some(TextEncoding::ShiftJis));
        assert_eq!(TextEncoding::parse("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::parse("utf8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::parse("EUC-JP"), Some(TextEncoding::EucJp));
    }

    #[test]
    fn encoding_parse_rejects_unknown_labels() {
        assert_eq!(TextEncoding::parse("iso-2022-jp"), None);
        assert_eq!(TextEncoding::parse(""), None);
        assert_eq!(TextEncoding::parse("latin1"), None);
    }

    #[test]
    fn encoding_labels_round_trip_through_parse() {
        for enc in [TextEncoding::ShiftJis, TextEncoding::Utf8, TextEncoding::EucJp] {
            assert_eq!(
                TextEncoding::parse(enc.as_str()),
                Some(enc),
                "canonical label {} should parse back to the same variant",
                enc
            );
        }
    }

    #[test]
    fn success_outcome_carries_text_and_matching_length() {
        let outcome = FetchOutcome::Success {
            text: "<html></html>".to_string(),
            byte_len: 13,
            content_type: Some("text/html".to_string()),
            encoding_used: TextEncoding::Utf8,
            stored_to: None,
        };
        assert!(outcome.is_success());
        assert_eq!(outcome.text(), Some("<html></html>"));
    }

    #[test]
    fn failure_outcome_never_exposes_text() {
        let outcome = FetchOutcome::failure(&crate::error::Error::Timeout(100));
        assert!(!outcome.is_success());
        assert_eq!(outcome.text(), None);
        match outcome {
            FetchOutcome::Failure { code, message } => {
                assert_eq!(code, "timeout_error");
                assert!(message.contains("100 ms"));
            }
            FetchOutcome::Success { .. } => panic!("expected a failure outcome"),
        }
    }

    #[test]
    fn event_serializes_with_snake_case_type_tag() {
        let event = FetchEvent::HeadersReceived {
            status: 200,
            content_type: Some("text/html; charset=Shift_JIS".to_string()),
            content_encoding: Some("gzip".to_string()),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "headers_received");
        assert_eq!(json["status"], 200);
        assert_eq!(json["content_encoding"], "gzip");
    }

    #[test]
    fn outcome_serializes_encoding_with_canonical_label() {
        let outcome = FetchOutcome::Success {
            text: String::new(),
            byte_len: 0,
            content_type: None,
            encoding_used: TextEncoding::ShiftJis,
            stored_to: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "success");
        assert_eq!(json["encoding_used"], "shift_jis");
        // skip_serializing_if should omit the storage field entirely
        assert!(json.get("stored_to").is_none());
    }
}

//! Byte-to-text conversion with a legacy-encoding-first fallback chain
//!
//! The source domain is a legacy site that serves either Shift-JIS or UTF-8
//! without reliably declaring which. The resolver therefore never guesses:
//! the requested decoder is tried strictly, a malformed-sequence fault falls
//! back to strict Shift-JIS, and the final tier is lossy UTF-8, which maps
//! any byte sequence to text (at worst with replacement characters). No
//! input can make this stage fail.

use encoding_rs::{EUC_JP, Encoding, SHIFT_JIS, UTF_8};

use crate::types::{DecodedContent, TextEncoding};

/// Decode a body buffer according to the requested encoding identifier
///
/// The identifier is matched case-insensitively; unrecognized identifiers
/// enter the fallback chain directly. `encoding_used` in the returned
/// content records the decoder that actually produced the text, which may
/// be a fallback rather than the request.
pub fn decode_body(bytes: &[u8], requested: &str) -> DecodedContent {
    let byte_len = bytes.len();
    let (text, encoding_used) = match TextEncoding::parse(requested) {
        // UTF-8 is lossy by definition and never falls back
        Some(TextEncoding::Utf8) => (decode_utf8_lossy(bytes), TextEncoding::Utf8),
        Some(TextEncoding::ShiftJis) => match decode_strict(SHIFT_JIS, bytes) {
            Some(text) => (text, TextEncoding::ShiftJis),
            None => fallback_chain(bytes),
        },
        Some(TextEncoding::EucJp) => match decode_strict(EUC_JP, bytes) {
            Some(text) => (text, TextEncoding::EucJp),
            None => fallback_chain(bytes),
        },
        None => fallback_chain(bytes),
    };

    DecodedContent {
        text,
        byte_len,
        encoding_used,
    }
}

/// Shift-JIS first, then lossy UTF-8. The second tier accepts any byte
/// sequence, so the chain always terminates in text.
fn fallback_chain(bytes: &[u8]) -> (String, TextEncoding) {
    if let Some(text) = decode_strict(SHIFT_JIS, bytes) {
        return (text, TextEncoding::ShiftJis);
    }
    (decode_utf8_lossy(bytes), TextEncoding::Utf8)
}

/// Decode with the given encoding, treating any malformed sequence as a
/// fault rather than substituting replacement characters
fn decode_strict(encoding: &'static Encoding, bytes: &[u8]) -> Option<String> {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors { None } else { Some(text.into_owned()) }
}

fn decode_utf8_lossy(bytes: &[u8]) -> String {
    UTF_8.decode_without_bom_handling(bytes).0.into_owned()
}

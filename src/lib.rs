//! # keiba-fetch
//!
//! Ingestion front-end for a horse-race data pipeline: fetches a single page
//! over HTTP(S), reverses server-applied content compression, decodes the
//! body under uncertain or legacy Japanese character encodings, optionally
//! persists the text, and reports exactly one terminal outcome per request.
//!
//! ## Design Philosophy
//!
//! - **One outcome per fetch** - every fault converts into a failure outcome
//!   at the stage where it occurs; no partial state escapes the pipeline
//! - **Legacy-encoding-first** - the source site mixes Shift-JIS and UTF-8
//!   without reliable declaration; decoding tries the requested encoding,
//!   then Shift-JIS, then UTF-8, and never fails
//! - **Library-first** - no CLI or UI, purely a Rust crate for embedding;
//!   downstream HTML extraction and scoring are the consumers
//! - **Event-driven observability** - consumers may subscribe to stage
//!   events; with no subscribers the fetch is unaffected
//!
//! ## Quick Start
//!
//! ```no_run
//! use keiba_fetch::{FetchConfig, FetchOutcome, PageFetcher};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = PageFetcher::new(FetchConfig::default())?;
//!
//!     match fetcher.fetch("https://race.example.jp/result/202608").await {
//!         FetchOutcome::Success { text, encoding_used, .. } => {
//!             println!("decoded {} chars as {}", text.chars().count(), encoding_used);
//!         }
//!         FetchOutcome::Failure { code, message } => {
//!             eprintln!("{code}: {message}");
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Content-encoding decompression
mod decompress;
/// Character decoding with the legacy-first fallback chain
pub mod encoding;
/// Error types
pub mod error;
/// The fetch pipeline
pub mod fetcher;
/// Text persistence
mod storage;
/// Request construction and dispatch
mod transport;
/// Core types and events
pub mod types;

// Re-export commonly used types
pub use config::FetchConfig;
pub use error::{Error, Result};
pub use fetcher::PageFetcher;
pub use types::{DecodedContent, FetchEvent, FetchOutcome, Stage, TextEncoding};

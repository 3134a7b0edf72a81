//! The fetch pipeline: request, decompress, accumulate, decode, persist,
//! report
//!
//! One [`PageFetcher::fetch`] call is one linear pass through the stages.
//! Each stage either advances the pipeline or converts its fault into an
//! [`Error`] at its own boundary; the entry point turns the final result
//! into exactly one [`FetchOutcome`]. No stage is re-entered, no partial
//! state is observable from outside, and the timeout timer covers the whole
//! pass from dispatch to terminal state.

use std::path::PathBuf;
use std::sync::Arc;

use futures::StreamExt;

use crate::config::FetchConfig;
use crate::decompress::BodyDecoder;
use crate::encoding;
use crate::error::{Error, Result};
use crate::storage;
use crate::transport;
use crate::types::{DecodedContent, FetchEvent, FetchOutcome, Stage};

/// Capacity of the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Fetches one remote page per call through the decode pipeline
///
/// Cloneable — the HTTP client pools connections internally and the
/// configuration is Arc-wrapped, so clones are cheap and independent fetches
/// may run concurrently. Each call owns its own response, buffer, and
/// outcome; nothing is shared between in-flight fetches.
#[derive(Clone)]
pub struct PageFetcher {
    /// Shared HTTP client (connection pooling across fetches)
    client: reqwest::Client,
    /// Immutable configuration
    config: Arc<FetchConfig>,
    /// Event broadcast channel sender (multiple subscribers supported)
    event_tx: tokio::sync::broadcast::Sender<FetchEvent>,
}

impl PageFetcher {
    /// Create a fetcher from a configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the configuration fails validation or
    /// the HTTP client cannot be constructed.
    pub fn new(config: FetchConfig) -> Result<Self> {
        config.validate()?;
        let client = transport::build_client()?;

        let (event_tx, _rx) = tokio::sync::broadcast::channel(EVENT_CHANNEL_CAPACITY);

        Ok(Self {
            client,
            config: Arc::new(config),
            event_tx,
        })
    }

    /// Subscribe to stage-transition events
    ///
    /// Events are emitted as the pipeline moves between stages and at the
    /// terminal outcome. With no subscribers they are dropped silently; the
    /// fetch itself never depends on a listener.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use keiba_fetch::{FetchConfig, PageFetcher};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = PageFetcher::new(FetchConfig::default())?;
    ///
    /// let mut events = fetcher.subscribe();
    /// tokio::spawn(async move {
    ///     while let Ok(event) = events.recv().await {
    ///         tracing::info!(?event, "fetch event");
    ///     }
    /// });
    /// # Ok(())
    /// # }
    /// ```
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<FetchEvent> {
        self.event_tx.subscribe()
    }

    /// Get the current configuration (cheap Arc clone)
    pub fn config(&self) -> Arc<FetchConfig> {
        Arc::clone(&self.config)
    }

    /// Emit an event to all subscribers
    ///
    /// send() errs when there are no receivers, which is fine — the event is
    /// dropped and the pipeline continues.
    fn emit_event(&self, event: FetchEvent) {
        self.event_tx.send(event).ok();
    }

    /// Fetch one resource and produce its single terminal outcome
    ///
    /// This method never returns an `Err`: every stage fault is converted
    /// into a failure outcome at the boundary where it occurred, the decode
    /// stage cannot fault at all, and the timeout timer aborting the
    /// in-flight request is itself a classified failure. Exactly one
    /// [`FetchOutcome`] is produced per call.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use keiba_fetch::{FetchConfig, FetchOutcome, PageFetcher};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let fetcher = PageFetcher::new(FetchConfig::default())?;
    ///
    /// match fetcher.fetch("https://race.example.jp/result/202608").await {
    ///     FetchOutcome::Success { text, encoding_used, .. } => {
    ///         println!("decoded {} chars as {}", text.chars().count(), encoding_used);
    ///     }
    ///     FetchOutcome::Failure { code, message } => {
    ///         eprintln!("{code}: {message}");
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, url: &str) -> FetchOutcome {
        let result = match tokio::time::timeout(self.config.timeout(), self.run_pipeline(url)).await
        {
            Ok(result) => result,
            // Dropping the pipeline future aborts the in-flight request and
            // releases the connection; late stream signals land on a dead
            // future and cannot mint a second outcome.
            Err(_elapsed) => Err(Error::Timeout(self.config.timeout_millis)),
        };

        match result {
            Ok((content, content_type, stored_to)) => {
                tracing::debug!(
                    %url,
                    bytes = content.byte_len,
                    encoding = %content.encoding_used,
                    "fetch complete"
                );
                self.emit_event(FetchEvent::Completed {
                    byte_len: content.byte_len,
                });
                FetchOutcome::Success {
                    text: content.text,
                    byte_len: content.byte_len,
                    content_type,
                    encoding_used: content.encoding_used,
                    stored_to,
                }
            }
            Err(err) => {
                tracing::warn!(%url, code = err.error_code(), error = %err, "fetch failed");
                self.emit_event(FetchEvent::Failed {
                    code: err.error_code().to_string(),
                    message: err.to_string(),
                });
                FetchOutcome::failure(&err)
            }
        }
    }

    /// The linear stage pipeline
    ///
    /// Faults convert to [`Error`] at the stage where they occur; the caller
    /// assembles the outcome. The `?` chain is the state machine — there is
    /// no path that produces two results or skips cleanup, since every early
    /// return drops the response and decoder.
    async fn run_pipeline(
        &self,
        url: &str,
    ) -> Result<(DecodedContent, Option<String>, Option<PathBuf>)> {
        let parsed = transport::validate_url(url)?;
        tracing::debug!(stage = ?Stage::Request, %url, "dispatching request");
        self.emit_event(FetchEvent::Requesting {
            url: url.to_string(),
        });

        let response =
            transport::issue_request(&self.client, parsed, self.config.user_agent.as_deref())
                .await?;

        let status = response.status();
        let content_type = header_value(&response, reqwest::header::CONTENT_TYPE);
        let content_encoding = header_value(&response, reqwest::header::CONTENT_ENCODING);
        self.emit_event(FetchEvent::HeadersReceived {
            status: status.as_u16(),
            content_type: content_type.clone(),
            content_encoding: content_encoding.clone(),
        });

        // Non-2xx: the body is not processed at all
        if !status.is_success() {
            return Err(Error::Request(format!("HTTP status {status} from '{url}'")));
        }

        let body = self.drain_body(response, content_encoding.as_deref()).await?;
        self.emit_event(FetchEvent::BodyComplete {
            byte_len: body.len(),
        });

        // This stage cannot fault; the fallback chain always yields text
        let content = encoding::decode_body(&body, &self.config.encoding);
        tracing::debug!(
            stage = ?Stage::Decode,
            encoding = %content.encoding_used,
            bytes = content.byte_len,
            "body decoded"
        );
        self.emit_event(FetchEvent::Decoded {
            encoding_used: content.encoding_used,
        });

        let stored_to = match &self.config.destination {
            Some(destination) => {
                tracing::debug!(stage = ?Stage::Persist, destination = %destination.display(), "storing text");
                let path = storage::persist_text(
                    destination,
                    &content.text,
                    self.config.auto_create_dir,
                )
                .await?;
                self.emit_event(FetchEvent::Stored { path: path.clone() });
                Some(path)
            }
            None => None,
        };

        Ok((content, content_type, stored_to))
    }

    /// Drain the response body through the content-encoding decoder
    ///
    /// Chunks arrive in network order; each one is pushed through the
    /// decoder into the accumulation buffer. Nothing is exposed downstream
    /// until the stream ends and the decoder finalizes — all-or-nothing
    /// framing per request.
    async fn drain_body(
        &self,
        response: reqwest::Response,
        content_encoding: Option<&str>,
    ) -> Result<Vec<u8>> {
        let mut decoder = BodyDecoder::for_encoding(content_encoding);
        let encoding_name = decoder.encoding_name();
        tracing::debug!(stage = ?Stage::Decompress, encoding = encoding_name, "wrapping body stream");

        let mut stream = response.bytes_stream();
        let mut received: usize = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::Stream(format!("body read failed: {e}")))?;
            received += chunk.len();
            decoder
                .write_chunk(&chunk)
                .map_err(|e| Error::Compression(format!("{encoding_name} decode failed: {e}")))?;
        }
        tracing::debug!(stage = ?Stage::Accumulate, bytes = received, "body stream complete");

        decoder
            .finish()
            .map_err(|e| Error::Compression(format!("{encoding_name} decode failed: {e}")))
    }
}

/// Extract a response header as an owned string, if present and valid
fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

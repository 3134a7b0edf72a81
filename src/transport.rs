//! Request construction and dispatch
//!
//! Owns the fixed header profile and the scheme check. A single shared
//! `reqwest::Client` serves both plain and TLS transports; which one a
//! request rides on follows from the validated URL scheme. The client does
//! no automatic decompression and carries no client-level timeout — the
//! decompression stage and the pipeline timer own those concerns.

use url::Url;

use crate::error::{Error, Result};

/// Default User-Agent: a desktop browser profile the source site serves
/// without fuss
pub(crate) const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// HTML-first content negotiation
pub(crate) const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Japanese-first language preference
pub(crate) const ACCEPT_LANGUAGE: &str = "ja,en-US;q=0.9,en;q=0.8";

/// The compression formats the decompression stage can reverse
pub(crate) const ACCEPT_ENCODING: &str = "gzip, deflate, br";

/// Validate a resource locator before any network activity
///
/// # Errors
///
/// Returns [`Error::Request`] for unparseable URLs and for schemes other
/// than `http` / `https`.
pub(crate) fn validate_url(url: &str) -> Result<Url> {
    let parsed =
        Url::parse(url).map_err(|e| Error::Request(format!("invalid URL '{url}': {e}")))?;

    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(Error::Request(format!(
            "unsupported URL scheme '{other}' in '{url}'"
        ))),
    }
}

/// Build the shared HTTP client
///
/// Redirects are not followed; a 3xx answer surfaces as a non-2xx status
/// fault like any other.
pub(crate) fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| Error::Config {
            message: format!("failed to build HTTP client: {e}"),
            key: None,
        })
}

/// Issue the GET with the fixed header profile
///
/// # Errors
///
/// Transport-level failures (DNS, refused connection, TLS) convert to
/// [`Error::Request`] here. Status checking is the caller's job, so the
/// status can also reach the event hook.
pub(crate) async fn issue_request(
    client: &reqwest::Client,
    url: Url,
    user_agent: Option<&str>,
) -> Result<reqwest::Response> {
    client
        .get(url.clone())
        .header(
            reqwest::header::USER_AGENT,
            user_agent.unwrap_or(DEFAULT_USER_AGENT),
        )
        .header(reqwest::header::ACCEPT, ACCEPT)
        .header(reqwest::header::ACCEPT_LANGUAGE, ACCEPT_LANGUAGE)
        .header(reqwest::header::ACCEPT_ENCODING, ACCEPT_ENCODING)
        .header(reqwest::header::CONNECTION, "keep-alive")
        .send()
        .await
        .map_err(|e| {
            if e.is_connect() {
                Error::Request(format!("connection failed for '{url}': {e}"))
            } else {
                Error::Request(format!("request to '{url}' failed: {e}"))
            }
        })
}

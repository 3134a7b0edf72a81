//! Fetch one race page and print a short summary
//!
//! This example plays the thin CLI collaborator: it fetches a URL, prints
//! the page title and embedded table count on success, and exits non-zero
//! with the error classification on failure.
//!
//! Usage: cargo run --example fetch_page -- <url> [destination]

use keiba_fetch::{FetchConfig, FetchOutcome, PageFetcher};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let Some(url) = args.next() else {
        eprintln!("usage: fetch_page <url> [destination]");
        std::process::exit(2);
    };

    let config = FetchConfig {
        destination: args.next().map(Into::into),
        ..Default::default()
    };
    let fetcher = PageFetcher::new(config)?;

    // Watch the pipeline move through its stages
    let mut events = fetcher.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            eprintln!("[event] {event:?}");
        }
    });

    match fetcher.fetch(&url).await {
        FetchOutcome::Success {
            text,
            byte_len,
            encoding_used,
            stored_to,
            ..
        } => {
            if let Some(title) = extract_title(&text) {
                println!("title: {title}");
            }
            println!("tables: {}", text.matches("<table").count());
            println!("size: {byte_len} bytes, encoding: {encoding_used}");
            if let Some(path) = stored_to {
                println!("stored to: {}", path.display());
            }
            Ok(())
        }
        FetchOutcome::Failure { code, message } => {
            eprintln!("{code}: {message}");
            std::process::exit(1);
        }
    }
}

/// Content of the first `<title>` element, if any
fn extract_title(html: &str) -> Option<&str> {
    let start = html.find("<title>")? + "<title>".len();
    let end = html[start..].find("</title>")?;
    Some(html[start..start + end].trim())
}

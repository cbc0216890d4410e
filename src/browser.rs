//! Opening URLs in the system browser
//!
//! Launching is best effort: each URL is handed to the platform opener and
//! failures are reported per URL without affecting the others.

use std::process::{Command, Stdio};
use thiserror::Error;

/// Failure to hand a URL to the system opener
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser for {url}: {source}")]
    Launch {
        url: String,
        source: std::io::Error,
    },

    #[error("Browser opener exited with {status} for {url}")]
    Exit { url: String, status: String },
}

/// `start` treats its first quoted argument as a window title
const WINDOWS_START_ARGS: &[&str] = &["/C", "start", ""];

const NO_ARGS: &[&str] = &[];

/// Command and leading arguments of the platform opener
fn opener() -> (&'static str, &'static [&'static str]) {
    if cfg!(target_os = "windows") {
        ("cmd", WINDOWS_START_ARGS)
    } else if cfg!(target_os = "macos") {
        ("open", NO_ARGS)
    } else {
        ("xdg-open", NO_ARGS)
    }
}

/// Opens one URL in the default browser
pub fn open_in_browser(url: &str) -> Result<(), BrowserError> {
    let (program, args) = opener();
    tracing::debug!("Opening {} with {}", url, program);

    let status = Command::new(program)
        .args(args)
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|source| BrowserError::Launch {
            url: url.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(BrowserError::Exit {
            url: url.to_string(),
            status: status.to_string(),
        });
    }

    Ok(())
}

/// Opens every URL, returning one result per URL in input order
pub fn open_all(urls: &[String]) -> Vec<(String, Result<(), BrowserError>)> {
    urls.iter()
        .map(|url| {
            let result = open_in_browser(url);
            if let Err(e) = &result {
                tracing::warn!("{}", e);
            }
            (url.clone(), result)
        })
        .collect()
}

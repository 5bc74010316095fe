//! Error types for pagedown operations.
//!
//! Failures at the fetch/dispatch boundary end a conversion, and so do
//! errors of the PDF converter and of the article renderer. Metadata,
//! caption and URL resolution problems degrade the output instead, so
//! those variants only surface when a collaborator is called directly.
//!
//! # Example
//!
//! ```rust
//! use pagedown_core::{PagedownError, Result};
//!
//! fn check_status(status: u16, url: &str) -> Result<()> {
//!     if status >= 400 {
//!         return Err(PagedownError::Upstream { status, url: url.to_string() });
//!     }
//!     Ok(())
//! }
//! # assert!(check_status(404, "https://example.com").is_err());
//! ```

use thiserror::Error;

/// Main error type for conversions.
#[derive(Error, Debug)]
pub enum PagedownError {
    /// No response could be obtained from the fetcher.
    ///
    /// Covers DNS failures, refused connections, TLS errors and similar.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout.
    ///
    /// Returned when an HTTP request exceeds the configured timeout duration.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// The upstream server answered with a status of 400 or above.
    #[error("Upstream returned HTTP {status} for {url}")]
    Upstream { status: u16, url: String },

    /// The declared content type is neither HTML nor PDF.
    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The body of an HTML response is not valid UTF-8.
    #[error("Failed to decode response body: {0}")]
    Decode(String),

    /// Invalid URL provided.
    ///
    /// Returned when a URL cannot be parsed or is not an absolute http(s) URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// HTML parsing errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The PDF converter failed. Propagated as-is.
    #[error("PDF conversion failed: {0}")]
    Pdf(String),

    /// The Markdown renderer failed.
    #[error("Markdown rendering failed: {0}")]
    Render(String),

    /// Social metadata could not be parsed, or the parser ran past the
    /// metadata timeout. Logged by the fallback path, never propagated.
    #[error("Metadata parsing failed: {0}")]
    Metadata(String),

    /// Captions could not be fetched or parsed.
    #[error("Caption fetch failed: {0}")]
    Captions(String),

    /// The converter was built without a required collaborator.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl PagedownError {
    /// Whether the error was raised at the fetch/dispatch boundary, before
    /// any content was looked at.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PagedownError::Transport(_)
                | PagedownError::Timeout { .. }
                | PagedownError::Upstream { .. }
                | PagedownError::UnsupportedContentType(_)
                | PagedownError::Decode(_)
        )
    }
}

#[cfg(feature = "fetch")]
impl From<reqwest::Error> for PagedownError {
    fn from(err: reqwest::Error) -> Self {
        PagedownError::Transport(err.to_string())
    }
}

/// Result type alias for PagedownError.
///
/// This is a convenience alias for `std::result::Result<T, PagedownError>`.
pub type Result<T> = std::result::Result<T, PagedownError>;

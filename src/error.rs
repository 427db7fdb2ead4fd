//! Error types and result handling for source adapters.
//!
//! Every adapter operation returns a [`Result<T>`]. When a page or payload is
//! missing something an adapter depends on, the adapter returns
//! [`Error::Source`] naming itself, so the caller can show which site broke.
//!
//! # Examples
//!
//! ```rust
//! use shiori::prelude::*;
//! use shiori::error::{Result, Error};
//!
//! # async fn example() -> Result<()> {
//! let sources = Sources::new();
//!
//! match sources.search("komi san").from_source("invalid").await {
//!     Ok(page) => println!("Found {} results", page.results.len()),
//!     Err(Error::NotFound(msg)) => println!("Source not found: {}", msg),
//!     Err(Error::Network(e)) => println!("Network error: {}", e),
//!     Err(e) => println!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```

use thiserror::Error;

/// Type alias for Results with shiori errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all adapter operations.
///
/// # Variants
///
/// * [`Network`](Error::Network) - HTTP client and connection errors
/// * [`Parse`](Error::Parse) - Data parsing and format errors
/// * [`Source`](Error::Source) - A site returned something the adapter cannot read
/// * [`NotFound`](Error::NotFound) - Missing resources
/// * [`RateLimit`](Error::RateLimit) - Rate limiting responses
/// * [`Unsupported`](Error::Unsupported) - The source does not offer an operation
/// * [`Io`](Error::Io) - IO errors
/// * [`Json`](Error::Json) - JSON deserialization errors
/// * [`Other`](Error::Other) - Generic error messages
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from the underlying HTTP client (reqwest),
    /// including timeouts, DNS failures and TLS errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The received data could not be parsed as expected.
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::parse("Invalid chapter code");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source-specific errors with contextual information.
    ///
    /// # Fields
    ///
    /// * `src` - The identifier of the source that encountered the error
    /// * `message` - What the adapter expected and did not find
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::source("manganelo", "Missing chapter list");
    /// ```
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// A requested resource (manga, chapter, source, section) does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The site rate-limited us. Carries the `Retry-After` value when sent.
    #[error("Rate limited, retry after {retry_after:?} seconds")]
    RateLimit { retry_after: Option<u64> },

    /// The source does not implement the requested operation.
    #[error("Source [{src}] does not support {operation}")]
    Unsupported { src: String, operation: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a parse error with the given message.
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::parse(format!("Expected {} pages, found {}", 10, 5));
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a source-specific error with source ID and message.
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::source("mangadex", "Failed to parse json results");
    /// ```
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates a not found error with the given message.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Creates a rate limit error with optional retry-after time.
    pub fn rate_limit(retry_after: Option<u64>) -> Self {
        Error::RateLimit { retry_after }
    }

    /// Creates an error for an operation the source does not offer.
    ///
    /// ```rust
    /// use shiori::Error;
    ///
    /// let error = Error::unsupported("hachirumi", "home page sections");
    /// assert!(error.to_string().contains("hachirumi"));
    /// ```
    pub fn unsupported(src: impl Into<String>, operation: impl Into<String>) -> Self {
        Error::Unsupported {
            src: src.into(),
            operation: operation.into(),
        }
    }
}

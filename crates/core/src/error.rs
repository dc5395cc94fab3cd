//! Error types for ogmeta operations.
//!
//! This module defines the main error type [`OgmetaError`] which represents
//! all possible errors that can occur during metadata extraction, fetching,
//! and batch processing.
//!
//! Malformed property names and non-numeric dimensions are not errors: the
//! extractor filters the former and records the latter as
//! [`PropertyValue::NotANumber`](crate::PropertyValue::NotANumber).
//!
//! # Example
//!
//! ```rust
//! use ogmeta_core::{OgmetaError, extract};
//!
//! match extract("http://example.com/", "<html></html>", None) {
//!     Ok(result) => println!("Base URL: {}", result.base_url),
//!     Err(OgmetaError::TraversalFailure { depth, limit }) => {
//!         println!("Document nested {} levels deep (limit {})", depth, limit);
//!     }
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

/// Main error type for metadata extraction operations.
#[derive(Error, Debug)]
pub enum OgmetaError {
    /// HTTP request errors from reqwest.
    ///
    /// This variant wraps network errors, DNS failures, connection issues,
    /// and other HTTP-related problems.
    #[cfg(feature = "fetch")]
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timeout.
    #[error("Request timed out after {timeout} seconds")]
    Timeout { timeout: u64 },

    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The server answered with a status that is neither success nor a
    /// redirect carrying a `Location` header.
    #[error("Invalid response. Code {status}")]
    InvalidResponse { status: u16 },

    /// HTML query errors, usually an invalid CSS selector.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// The document tree is nested deeper than the extractor will walk.
    ///
    /// Returned instead of attempting a traversal that could exhaust the
    /// stack on pathological markup.
    #[error("Document nesting depth {depth} exceeds the traversal limit of {limit}")]
    TraversalFailure { depth: usize, limit: usize },

    /// Batch request without a usable `batch` array.
    #[error("Invalid batch request: {0}")]
    InvalidBatch(String),

    /// A result sink refused or failed to accept an outcome.
    #[error("Result delivery failed: {0}")]
    SinkError(String),

    /// JSON encoding or decoding errors.
    #[error("Serialization failed: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors while reading input or writing output.
    #[error("I/O error: {0}")]
    WriteError(#[from] std::io::Error),
}

/// Result type alias for OgmetaError.
///
/// This is a convenience alias for `std::result::Result<T, OgmetaError>`.
pub type Result<T> = std::result::Result<T, OgmetaError>;

//! Error types for arnold-client

use thiserror::Error;

/// Result type alias using arnold-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the agent endpoint
#[derive(Error, Debug)]
pub enum Error {
    /// SSE stream could not be established or broke down
    #[error("SSE error: {0}")]
    Sse(String),

    /// Invalid header name or value supplied at construction
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
}

//! Error types for `Hoist` core library.

use thiserror::Error;

/// Result type alias using `Hoist` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `Hoist` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

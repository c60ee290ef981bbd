//! Rendering error types.

use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Rendering error types.
#[derive(Error, Debug)]
pub enum Error {
    /// The drawing backend failed, including unwritable destinations.
    #[error("drawing error: {0}")]
    Drawing(String),

    /// The text face could not be loaded.
    #[error("font error: {0}")]
    Font(String),

    /// Render options are unusable.
    #[error("invalid render options: {0}")]
    InvalidOptions(String),
}

pub(crate) fn drawing_error<E: std::fmt::Display>(err: E) -> Error {
    Error::Drawing(err.to_string())
}

use thiserror::Error;

/// Errors that can occur while sharing, viewing or storing recipes
#[derive(Error, Debug)]
pub enum ShareError {
    /// The payload could not be serialized into a share token, e.g. a map
    /// whose keys are not strings
    #[error("Could not create share link: {0}")]
    Encode(String),

    /// The token is not a share token this application produced
    #[error(transparent)]
    InvalidToken(#[from] InvalidToken),

    /// Writing the share link to the clipboard failed
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    /// Failed to reach the recipe backend
    #[error("Failed to reach backend: {0}")]
    Fetch(#[from] reqwest::Error),

    /// The recipe backend answered with an error status
    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    /// A backend call needs a signed-in session
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Input rejected before it reached the backend
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    Builder(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON could not be read or written
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Why a token failed to decode.
///
/// Decoding never panics; every malformed, truncated or foreign token ends up
/// here so the caller can render its fallback view.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidToken {
    #[error("Invalid or corrupted share link: no token")]
    Missing,
    #[error("Invalid or corrupted share link: unexpected character")]
    Alphabet,
    #[error("Invalid or corrupted share link: corrupt compressed data")]
    Corrupt,
    #[error("Invalid or corrupted share link: payload is not JSON")]
    NotJson,
    #[error("Invalid or corrupted share link: payload is not a recipe")]
    NotAnObject,
}

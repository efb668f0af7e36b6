//! Error types for the gesture-to-keystroke library.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization of gesture records failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// `X11` window system operation failed
    #[error("X11 error: {0}")]
    X11(String),

    /// Key emission failed
    #[error("Key dispatch error: {0}")]
    KeyDispatch(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Operation not allowed in the current detection loop state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Camera or hand detector could not be acquired
    #[error("Collaborator unavailable: {0}")]
    CollaboratorUnavailable(String),

    /// Gesture store operation failed
    #[error("Gesture store error: {0}")]
    StoreError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Generic I/O error with description
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::CollaboratorUnavailable("camera permission denied".to_string());
        assert_eq!(err.to_string(), "Collaborator unavailable: camera permission denied");

        let err = Error::KeyDispatch("no keycode for 'ß'".to_string());
        assert!(err.to_string().starts_with("Key dispatch error"));
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<Vec<u8>, _> = serde_json::from_str("not json");
        let err: Error = parse.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}

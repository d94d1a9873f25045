//! # Error Types
//!
//! Custom error types for Stick Cursor using `thiserror`.

use thiserror::Error;

/// Main error type for Stick Cursor
#[derive(Debug, Error)]
pub enum StickCursorError {
    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Persisted settings could not be encoded
    #[error("Settings serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// User-supplied setting value was rejected
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    /// No game controller with analog sticks was found
    #[error("No game controller found")]
    ControllerNotFound,

    /// Game controller I/O failure
    #[error("Controller error: {0}")]
    Controller(String),

    /// No keyboard able to report the exit key was found
    #[error("No keyboard device found for exit key detection")]
    KeyboardNotFound,

    /// Virtual pointer device failure
    #[error("Cursor error: {0}")]
    Cursor(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Stick Cursor
pub type Result<T> = std::result::Result<T, StickCursorError>;

// src/error.rs

//! Unified error handling for the crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP transport failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    /// A request or navigation step did not finish in time
    #[error("Timed out after {secs}s: {context}")]
    Timeout { context: String, secs: u64 },

    /// A response body could not be interpreted
    #[error("Parse error in {context}: {message}")]
    Parse { context: String, message: String },

    /// Listing markup did not line up into whole postings
    #[error("Structural mismatch at posting container {index}: {message}")]
    StructuralMismatch { index: usize, message: String },

    /// Named iframe missing on the detail page, or its source is empty
    #[error("Frame '{frame}' not found")]
    FrameNotFound { frame: String },

    /// Browser session failed to launch or a browser operation failed
    #[error("Browser error during {context}: {message}")]
    Browser { context: String, message: String },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Coarse error categories callers branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Parse,
    StructuralMismatch,
    FrameNotFound,
    Browser,
    Other,
}

impl AppError {
    /// Map a failed `reqwest` call, keeping timeouts apart from other failures.
    pub fn request(url: &str, secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                context: format!("request to {url}"),
                secs,
            }
        } else {
            Self::Network(err)
        }
    }

    /// Create a timeout error.
    pub fn timeout(context: impl Into<String>, secs: u64) -> Self {
        Self::Timeout {
            context: context.into(),
            secs,
        }
    }

    /// Create a parse error with context.
    pub fn parse(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Parse {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a structural mismatch error for the given container.
    pub fn mismatch(index: usize, message: impl Into<String>) -> Self {
        Self::StructuralMismatch {
            index,
            message: message.into(),
        }
    }

    /// Create a frame-not-found error.
    pub fn frame_not_found(frame: impl Into<String>) -> Self {
        Self::FrameNotFound {
            frame: frame.into(),
        }
    }

    /// Create a browser error with context.
    pub fn browser(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Browser {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) | Self::HttpStatus { .. } => ErrorKind::Network,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::StructuralMismatch { .. } => ErrorKind::StructuralMismatch,
            Self::FrameNotFound { .. } => ErrorKind::FrameNotFound,
            Self::Browser { .. } => ErrorKind::Browser,
            _ => ErrorKind::Other,
        }
    }
}

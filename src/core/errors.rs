//! Custom error types for OHT client operations

use thiserror::Error;

/// OHT client errors
#[derive(Error, Debug)]
pub enum OhtError {
    /// Response text is not syntactically valid JSON
    #[error("Malformed input at line {line}, column {column}: {message}")]
    MalformedInput {
        /// Parser message
        message: String,
        /// 1-based line of the error
        line: usize,
        /// 1-based column of the error
        column: usize,
    },

    /// Network error
    #[error("Network error: {message}")]
    NetworkError {
        /// Transport message
        message: String,
    },

    /// File operation error
    #[error("File error: {path} - {message}")]
    FileError {
        /// File that failed
        path: String,
        /// Underlying IO message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// What is wrong with the configuration
        message: String,
    },

    /// Wrapper for anyhow errors
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl OhtError {
    /// True when the error came from decoding a response body
    pub fn is_malformed_input(&self) -> bool {
        matches!(self, OhtError::MalformedInput { .. })
    }
}

impl From<serde_json::Error> for OhtError {
    fn from(err: serde_json::Error) -> Self {
        OhtError::MalformedInput {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl From<anyhow::Error> for OhtError {
    fn from(err: anyhow::Error) -> Self {
        OhtError::InternalError(err.to_string())
    }
}

/// Result type for OHT client operations
pub type Result<T> = std::result::Result<T, OhtError>;

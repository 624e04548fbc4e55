//! Error types for cp-core

use thiserror::Error;

/// Main error type for cp-core
#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Print service returned {status}: {body}")]
    PrintService { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to acknowledge message: {0}")]
    Acknowledge(String),
}

/// Result type alias for cp-core
pub type Result<T> = std::result::Result<T, Error>;

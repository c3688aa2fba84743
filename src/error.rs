use std::io;
use thiserror::Error;

/// Custom result type alias for the application
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Errors that can occur while explaining a repository
#[derive(Debug, Error)]
pub enum ServiceError {
    /// I/O errors
    #[error("IO error: {0}")]
    IO(#[from] io::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// GitHub API specific errors
    #[error("{0}")]
    GitHubApi(String),

    /// Language model backend errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Input validation errors
    #[error("{0}")]
    Validation(String),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(String),

    /// General message errors
    #[error("{0}")]
    Message(String),
}

impl ServiceError {
    /// Creates a new error with the specified message
    pub fn new(message: &str) -> Self {
        Self::Message(message.to_string())
    }

    /// Whether this error was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

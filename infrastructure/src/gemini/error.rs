//! Error types for the Gemini adapter

use thiserror::Error;
use weaver_application::GatewayError;

/// Result type alias for Gemini operations
pub type Result<T> = std::result::Result<T, GeminiError>;

/// Errors that can occur when talking to the Gemini REST API
#[derive(Error, Debug)]
pub enum GeminiError {
    #[error("{env} is not set and no api_key is configured")]
    MissingApiKey { env: String },

    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("Could not reach Gemini: {0}")]
    Transport(String),

    #[error("Gemini request timed out")]
    Timeout,

    #[error("HTTP {status} error: {message}")]
    Http { status: u16, message: String },

    #[error("Failed to decode Gemini response: {0}")]
    Decode(String),

    #[error("Prompt was blocked: {0}")]
    Blocked(String),

    #[error("{0}")]
    Empty(String),
}

impl From<reqwest::Error> for GeminiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            GeminiError::Timeout
        } else if error.is_decode() {
            GeminiError::Decode(error.to_string())
        } else {
            GeminiError::Transport(error.to_string())
        }
    }
}

impl From<GeminiError> for GatewayError {
    fn from(error: GeminiError) -> Self {
        match error {
            GeminiError::MissingApiKey { .. } => GatewayError::AuthFailed(error.to_string()),
            GeminiError::Http {
                status: 401 | 403,
                message,
            } => GatewayError::AuthFailed(message),
            GeminiError::Http { status, message } => GatewayError::Http { status, message },
            GeminiError::Transport(message) => GatewayError::ConnectionError(message),
            GeminiError::Timeout => GatewayError::Timeout,
            GeminiError::Empty(message) => GatewayError::EmptyResponse(message),
            GeminiError::ClientBuild(_) | GeminiError::Decode(_) | GeminiError::Blocked(_) => {
                GatewayError::RequestFailed(error.to_string())
            }
        }
    }
}

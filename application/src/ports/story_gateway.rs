//! Story provider ports
//!
//! Two external capabilities back every turn: a stateful narrator session
//! that answers with structured story JSON, and a stateless illustrator.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use weaver_domain::{ImageRef, StoryPrompt};

/// Errors that can occur while talking to a provider.
///
/// Every variant is a *provider* failure (transport, auth, quota, timeout).
/// Malformed story payloads are not reported here; the orchestrator
/// validates them itself.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    #[error("HTTP {status} error: {message}")]
    Http { status: u16, message: String },

    #[error("Session error: {0}")]
    SessionError(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Provider returned no content: {0}")]
    EmptyResponse(String),

    #[error("The provider did not answer in time")]
    Timeout,

    #[error("Other error: {0}")]
    Other(String),
}

/// Fixed configuration installed once when a narrator session is created
#[derive(Debug, Clone, PartialEq)]
pub struct SessionBrief {
    pub system_instruction: String,
    pub response_schema: Value,
}

impl SessionBrief {
    pub fn new(system_instruction: impl Into<String>, response_schema: Value) -> Self {
        Self {
            system_instruction: system_instruction.into(),
            response_schema,
        }
    }

    /// The interactive-story brief: narrator rules plus the story/choices schema
    pub fn story() -> Self {
        Self::new(
            StoryPrompt::system_instruction(),
            StoryPrompt::response_schema(),
        )
    }
}

/// Creates narrator sessions.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait NarrativeGateway: Send + Sync {
    /// Establish a new conversational context seeded with `brief`.
    ///
    /// Called exactly once per story session.
    async fn create_session(
        &self,
        brief: &SessionBrief,
    ) -> Result<Box<dyn NarrativeSession>, GatewayError>;
}

/// An active narrator conversation.
///
/// The session carries the provider's memory across turns. It has exactly
/// one owner at a time, hence `&mut self`.
#[async_trait]
pub trait NarrativeSession: Send {
    /// Send `text` as the next user turn and return the raw reply text.
    ///
    /// The reply is returned unvalidated; it may not even be JSON.
    async fn advance(&mut self, text: &str) -> Result<String, GatewayError>;
}

/// Renders illustrations from text prompts. Stateless.
#[async_trait]
pub trait IllustrationGateway: Send + Sync {
    async fn render_image(&self, prompt: &str) -> Result<ImageRef, GatewayError>;
}

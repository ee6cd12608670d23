//! Gemini narrator session
//!
//! `generateContent` is stateless, so the session keeps the conversation
//! locally and resends all of it on every turn. That transcript is the
//! provider's memory of the story.

use super::client::GeminiClient;
use super::error::GeminiError;
use super::protocol::{Content, GenerateContentRequest, GenerationConfig};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;
use weaver_application::{GatewayError, NarrativeSession, SessionBrief};

pub struct GeminiStorySession {
    client: Arc<GeminiClient>,
    system_instruction: Content,
    generation_config: GenerationConfig,
    history: Vec<Content>,
}

impl GeminiStorySession {
    pub fn new(client: Arc<GeminiClient>, brief: &SessionBrief) -> Self {
        Self {
            client,
            system_instruction: Content::instruction(brief.system_instruction.clone()),
            generation_config: GenerationConfig::json(brief.response_schema.clone()),
            history: Vec::new(),
        }
    }

    /// Completed user/model exchanges so far
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    async fn send(&self, contents: &[Content]) -> Result<String, GeminiError> {
        let request = GenerateContentRequest {
            system_instruction: &self.system_instruction,
            contents,
            generation_config: &self.generation_config,
        };
        let response = self.client.generate_content(&request).await?;

        if let Some(text) = response.first_text() {
            return Ok(text);
        }
        if let Some(reason) = response.block_reason() {
            return Err(GeminiError::Blocked(reason.to_string()));
        }
        let finish = response
            .candidates
            .first()
            .and_then(|c| c.finish_reason.clone())
            .unwrap_or_else(|| "no candidates".to_string());
        Err(GeminiError::Empty(format!("narrative reply was empty ({})", finish)))
    }
}

#[async_trait]
impl NarrativeSession for GeminiStorySession {
    async fn advance(&mut self, text: &str) -> Result<String, GatewayError> {
        let mut contents = self.history.clone();
        contents.push(Content::user(text));

        let reply = self.send(&contents).await?;
        debug!(bytes = reply.len(), turns = contents.len(), "Narrative reply received");

        // Only a completed exchange joins the transcript; a failed turn
        // leaves the context exactly as it was.
        contents.push(Content::model(reply.clone()));
        self.history = contents;
        Ok(reply)
    }
}

//! Gemini implementation of the story provider ports

use super::client::{GeminiClient, GeminiSettings};
use super::error::{GeminiError, Result};
use super::protocol::PredictRequest;
use super::session::GeminiStorySession;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};
use weaver_application::{
    GatewayError, IllustrationGateway, NarrativeGateway, NarrativeSession, SessionBrief,
};
use weaver_domain::ImageRef;

/// Narrator and illustrator backed by one Gemini API key
pub struct GeminiGateway {
    client: Arc<GeminiClient>,
}

impl GeminiGateway {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(GeminiError::MissingApiKey {
                env: settings.api_key_env,
            });
        }
        info!(
            text_model = %settings.text_model,
            image_model = %settings.image_model,
            "Gemini gateway ready"
        );
        Ok(Self {
            client: Arc::new(GeminiClient::new(settings)?),
        })
    }

    pub fn settings(&self) -> &GeminiSettings {
        self.client.settings()
    }
}

#[async_trait]
impl NarrativeGateway for GeminiGateway {
    async fn create_session(
        &self,
        brief: &SessionBrief,
    ) -> std::result::Result<Box<dyn NarrativeSession>, GatewayError> {
        debug!(model = %self.settings().text_model, "Creating narrator session");
        Ok(Box::new(GeminiStorySession::new(self.client.clone(), brief)))
    }
}

#[async_trait]
impl IllustrationGateway for GeminiGateway {
    async fn render_image(&self, prompt: &str) -> std::result::Result<ImageRef, GatewayError> {
        let settings = self.settings();
        let request =
            PredictRequest::single(prompt, &settings.aspect_ratio, &settings.image_mime_type);
        let response = self.client.predict(&request).await?;

        let Some(prediction) = response.predictions.into_iter().next() else {
            return Err(GeminiError::Empty("image generation returned no images".into()).into());
        };
        let Some(bytes) = prediction.bytes_base64_encoded else {
            let reason = prediction
                .rai_filtered_reason
                .unwrap_or_else(|| "no image data".to_string());
            return Err(GeminiError::Empty(format!("image was not generated: {}", reason)).into());
        };

        let mime = prediction
            .mime_type
            .unwrap_or_else(|| settings.image_mime_type.clone());
        debug!(bytes = bytes.len(), mime = %mime, "Illustration received");
        Ok(ImageRef::new(format!("data:{};base64,{}", mime, bytes)))
    }
}

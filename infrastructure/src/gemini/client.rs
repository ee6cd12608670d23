//! Thin reqwest wrapper for the Gemini REST endpoints

use super::error::{GeminiError, Result};
use super::protocol::{
    ApiErrorEnvelope, GenerateContentRequest, GenerateContentResponse, PredictRequest,
    PredictResponse,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Environment variable read for the API key unless configured otherwise
pub const DEFAULT_API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Resolved connection settings for the Gemini adapter
#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    /// Variable the key was expected in, for error messages
    pub api_key_env: String,
    pub base_url: String,
    pub text_model: String,
    pub image_model: String,
    pub aspect_ratio: String,
    pub image_mime_type: String,
}

impl GeminiSettings {
    /// Settings with the stock models and the given key
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            aspect_ratio: "16:9".to_string(),
            image_mime_type: "image/jpeg".to_string(),
        }
    }

    fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/v1beta/models/{}:{}",
            self.base_url.trim_end_matches('/'),
            model,
            method
        )
    }
}

/// HTTP client shared by narrator sessions and the illustrator
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    settings: GeminiSettings,
}

impl GeminiClient {
    pub fn new(settings: GeminiSettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("story-weaver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GeminiError::ClientBuild(e.to_string()))?;
        Ok(Self { http, settings })
    }

    pub fn settings(&self) -> &GeminiSettings {
        &self.settings
    }

    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<GenerateContentResponse> {
        let url = self
            .settings
            .endpoint(&self.settings.text_model, "generateContent");
        debug!(
            model = %self.settings.text_model,
            turns = request.contents.len(),
            "Calling generateContent"
        );
        self.post_json(&url, request).await
    }

    pub async fn predict(&self, request: &PredictRequest) -> Result<PredictResponse> {
        let url = self.settings.endpoint(&self.settings.image_model, "predict");
        debug!(model = %self.settings.image_model, "Calling predict");
        self.post_json(&url, request).await
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.settings.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeminiError::Http {
                status: status.as_u16(),
                message: error_message(&body, status.canonical_reason()),
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| GeminiError::Decode(e.to_string()))
    }
}

/// Best human-readable message for a failed call
fn error_message(body: &str, reason: Option<&str>) -> String {
    if let Ok(envelope) = serde_json::from_str::<ApiErrorEnvelope>(body)
        && !envelope.error.message.is_empty()
    {
        return envelope.error.message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return weaver_domain::core::string::truncate(trimmed, 200);
    }
    reason.unwrap_or("Unknown").to_string()
}

//! Provider configuration from TOML (`[provider]` section)

use crate::gemini::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, GeminiError, GeminiSettings};
use serde::{Deserialize, Serialize};

/// Gemini API settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    /// Environment variable name for the API key (default: "GEMINI_API_KEY").
    pub api_key_env: String,
    /// Direct API key (not recommended, use the env var instead).
    pub api_key: Option<String>,
    /// Base URL for the Gemini REST API.
    pub base_url: String,
    /// Model used for the narrative.
    pub text_model: String,
    /// Model used for illustrations.
    pub image_model: String,
    /// Illustration aspect ratio.
    pub aspect_ratio: String,
    /// Illustration MIME type.
    pub image_mime_type: String,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            text_model: "gemini-2.5-flash".to_string(),
            image_model: "imagen-3.0-generate-002".to_string(),
            aspect_ratio: "16:9".to_string(),
            image_mime_type: "image/jpeg".to_string(),
        }
    }
}

impl FileProviderConfig {
    /// API key from the configured variable, falling back to `api_key`.
    ///
    /// Blank values count as unset at either source.
    pub fn resolve_api_key(&self) -> Option<String> {
        let usable = |key: &String| !key.trim().is_empty();
        std::env::var(&self.api_key_env)
            .ok()
            .filter(usable)
            .or_else(|| self.api_key.clone().filter(usable))
    }

    /// Connection settings for the Gemini adapter.
    ///
    /// Fails when no API key can be found.
    pub fn to_settings(&self) -> Result<GeminiSettings, GeminiError> {
        let api_key = self
            .resolve_api_key()
            .ok_or_else(|| GeminiError::MissingApiKey {
                env: self.api_key_env.clone(),
            })?;
        Ok(GeminiSettings {
            api_key,
            api_key_env: self.api_key_env.clone(),
            base_url: self.base_url.clone(),
            text_model: self.text_model.clone(),
            image_model: self.image_model.clone(),
            aspect_ratio: self.aspect_ratio.clone(),
            image_mime_type: self.image_mime_type.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_key_wins_over_file_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STORY_TEST_KEY", "from-env");
            let config = FileProviderConfig {
                api_key_env: "STORY_TEST_KEY".to_string(),
                api_key: Some("from-file".to_string()),
                ..Default::default()
            };
            assert_eq!(config.resolve_api_key().as_deref(), Some("from-env"));
            Ok(())
        });
    }

    #[test]
    fn test_blank_env_key_falls_back_to_file_key() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("STORY_TEST_KEY", "  ");
            let config = FileProviderConfig {
                api_key_env: "STORY_TEST_KEY".to_string(),
                api_key: Some("from-file".to_string()),
                ..Default::default()
            };
            assert_eq!(config.resolve_api_key().as_deref(), Some("from-file"));

            let config = FileProviderConfig {
                api_key: Some(" ".to_string()),
                ..config
            };
            assert_eq!(config.resolve_api_key(), None);
            Ok(())
        });
    }

    #[test]
    fn test_missing_key_is_an_error() {
        let config = FileProviderConfig {
            api_key_env: "STORY_WEAVER_TEST_UNSET_KEY".to_string(),
            ..Default::default()
        };
        let error = config.to_settings().unwrap_err();
        assert!(error.to_string().contains("STORY_WEAVER_TEST_UNSET_KEY"));
    }

    #[test]
    fn test_settings_carry_models() {
        let config = FileProviderConfig {
            api_key_env: "STORY_WEAVER_TEST_UNSET_KEY".to_string(),
            api_key: Some("file-key".to_string()),
            text_model: "gemini-2.0-flash".to_string(),
            ..Default::default()
        };
        let settings = config.to_settings().unwrap();
        assert_eq!(settings.api_key, "file-key");
        assert_eq!(settings.api_key_env, "STORY_WEAVER_TEST_UNSET_KEY");
        assert_eq!(settings.text_model, "gemini-2.0-flash");
        assert_eq!(settings.image_model, "imagen-3.0-generate-002");
    }
}

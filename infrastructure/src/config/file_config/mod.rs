//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod behavior;
mod feedback;
mod logging;
mod output;
mod provider;
mod repl;

pub use behavior::FileBehaviorConfig;
pub use feedback::FileFeedbackConfig;
pub use logging::FileLoggingConfig;
pub use output::{FileOutputConfig, FileOutputFormat};
pub use provider::FileProviderConfig;
pub use repl::FileReplConfig;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use weaver_application::BehaviorConfig;

/// Configuration rejected after loading
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("behavior.timeout_seconds cannot be 0")]
    InvalidTimeout,

    #[error("{field} cannot be empty")]
    EmptyModelName { field: &'static str },
}

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Gemini connection and model selection
    pub provider: FileProviderConfig,
    /// Provider-call limits
    pub behavior: FileBehaviorConfig,
    /// Output settings
    pub output: FileOutputConfig,
    /// REPL settings
    pub repl: FileReplConfig,
    /// Feedback cue settings
    pub feedback: FileFeedbackConfig,
    /// Transcript and diagnostics destinations
    pub logging: FileLoggingConfig,
}

impl FileConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Some(0) = self.behavior.timeout_seconds {
            return Err(ConfigValidationError::InvalidTimeout);
        }

        let models = [
            ("provider.text_model", &self.provider.text_model),
            ("provider.image_model", &self.provider.image_model),
        ];
        for (field, model) in models {
            if model.trim().is_empty() {
                return Err(ConfigValidationError::EmptyModelName { field });
            }
        }

        Ok(())
    }

    /// Application-level behavior derived from `[behavior]`
    pub fn behavior_config(&self) -> BehaviorConfig {
        BehaviorConfig::from_timeout_seconds(self.behavior.timeout_seconds)
    }
}

//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use weaver_domain::OutputFormat;

// Re-export OutputFormat from domain for convenience
pub use weaver_domain::OutputFormat as FileOutputFormat;

/// Raw output configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// One-shot output format (uses domain type)
    pub format: Option<OutputFormat>,
    /// Enable colored terminal output
    pub color: bool,
    /// Directory to save illustrations into
    pub image_dir: Option<String>,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            color: true,
            image_dir: None,
        }
    }
}

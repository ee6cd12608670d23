//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Directory for JSONL story transcripts. Unset disables transcripts.
    pub transcript_dir: Option<String>,
    /// Write diagnostics to this file instead of stderr
    pub log_file: Option<String>,
}

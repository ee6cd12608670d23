//! Presentation-level configuration
//!
//! Configuration for output formatting and REPL behavior.

use std::path::PathBuf;
use weaver_domain::OutputFormat;

/// Output configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// One-shot output format
    pub format: OutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Text,
            color: true,
        }
    }
}

/// REPL configuration for the presentation layer
#[derive(Debug, Clone, Default)]
pub struct ReplConfig {
    /// Path to history file
    pub history_file: Option<PathBuf>,
}

impl ReplConfig {
    /// Configured history file, or `<data dir>/story-weaver/history.txt`.
    ///
    /// A leading `~/` is expanded to the home directory.
    pub fn history_path(&self) -> Option<PathBuf> {
        match &self.history_file {
            Some(path) => match path.strip_prefix("~") {
                Ok(rest) => dirs::home_dir().map(|home| home.join(rest)),
                Err(_) => Some(path.clone()),
            },
            None => dirs::data_dir().map(|p| p.join("story-weaver").join("history.txt")),
        }
    }
}

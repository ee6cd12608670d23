//! Feedback cue configuration from TOML (`[feedback]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileFeedbackConfig {
    /// Play terminal bell cues on story transitions
    pub cues: bool,
}

impl Default for FileFeedbackConfig {
    fn default() -> Self {
        Self { cues: true }
    }
}

//! Behavior configuration from TOML (`[behavior]` section)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBehaviorConfig {
    /// Limit for each provider call, in seconds. Unset means no limit.
    pub timeout_seconds: Option<u64>,
}

impl Default for FileBehaviorConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: Some(90),
        }
    }
}

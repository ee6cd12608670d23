//! Configuration file loading for story-weaver
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `STORY_WEAVER_*` environment variables (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./story-weaver.toml` or `./.story-weaver.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/story-weaver/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileBehaviorConfig, FileConfig, FileFeedbackConfig, FileLoggingConfig,
    FileOutputConfig, FileOutputFormat, FileProviderConfig, FileReplConfig,
};
pub use loader::{ConfigLoader, ENV_PREFIX};

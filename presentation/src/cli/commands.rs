//! CLI command definitions

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use weaver_domain::OutputFormat as DomainOutputFormat;

/// Output format for one-shot mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored story text with the three choices
    Text,
    /// The story snapshot as JSON (includes the image data URL)
    Json,
}

impl From<OutputFormat> for DomainOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => DomainOutputFormat::Text,
            OutputFormat::Json => DomainOutputFormat::Json,
        }
    }
}

/// CLI arguments for story-weaver
#[derive(Parser, Debug)]
#[command(name = "story-weaver")]
#[command(author, version, about = "Interactive fiction - an illustrated story that branches on your choices")]
#[command(long_about = r#"
Story Weaver writes an illustrated story with you, one scene at a time.

You describe an opening scene. The narrator answers with the next part of
the story, an illustration and three choices. Pick one (or type your own)
and the story continues from there.

Configuration files are loaded from (in priority order):
1. STORY_WEAVER_* environment variables
2. --config <path>          Explicit config file
3. ./story-weaver.toml      Project-level config
4. ~/.config/story-weaver/config.toml   Global config

The Gemini API key is read from GEMINI_API_KEY unless configured otherwise.

Example:
  story-weaver
  story-weaver "A lighthouse keeper finds a message in a bottle"
  story-weaver --once -o json "A city built inside a whale"
"#)]
pub struct Cli {
    /// Opening scene (starts the story right away)
    pub opening: Option<String>,

    /// Generate only the opening segment, print it and exit
    #[arg(long, requires = "opening")]
    pub once: bool,

    /// Output format for --once
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable terminal feedback cues
    #[arg(long)]
    pub no_cues: bool,

    /// Save every illustration into this directory
    #[arg(long, value_name = "DIR")]
    pub image_dir: Option<PathBuf>,

    /// Write a JSONL transcript of the story into this directory
    #[arg(long, value_name = "DIR")]
    pub transcript_dir: Option<PathBuf>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, conflicts_with = "config")]
    pub no_config: bool,

    /// Show configuration sources and the effective configuration, then exit
    #[arg(long)]
    pub show_config: bool,
}

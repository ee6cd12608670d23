//! Presentation layer for story-weaver
//!
//! This crate contains the CLI definition, the interactive story REPL,
//! console formatting, the in-flight spinner and the feedback cue channel.

pub mod chat;
pub mod cli;
pub mod config;
pub mod feedback;
pub mod output;
pub mod progress;

// Re-export commonly used types
pub use chat::{ReplAction, ReplCommand, StoryRepl};
pub use cli::commands::{Cli, OutputFormat};
pub use config::{OutputConfig, ReplConfig};
pub use feedback::{Cue, CuePlayer, FeedbackCues, TerminalBell};
pub use output::console::StoryFormatter;
pub use progress::reporter::TurnSpinner;

//! Interactive story module
//!
//! Provides a reedline-based interactive loop for playing a story.

mod command;
mod repl;

pub use command::{ReplAction, ReplCommand};
pub use repl::StoryRepl;

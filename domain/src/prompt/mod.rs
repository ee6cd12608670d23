//! Prompt domain
//!
//! The fixed narrator instruction, the structured-output schema and the
//! message templates used for every turn.

mod template;

pub use template::StoryPrompt;

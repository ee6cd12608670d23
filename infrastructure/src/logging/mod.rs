//! Logging infrastructure: structured story transcripts.
//!
//! Provides [`JsonlStoryLogger`], a JSONL file writer that implements
//! the [`StoryLogger`](weaver_application::StoryLogger) port.

mod jsonl_logger;

pub use jsonl_logger::JsonlStoryLogger;

//! Port for the structured story transcript.
//!
//! Separate from `tracing` diagnostics: tracing carries human-readable
//! operational messages, while this port records what was asked and what
//! the story became, in a machine-readable form (JSONL).

use serde_json::Value;

/// A structured transcript record.
pub struct StoryLogEvent {
    /// Event type identifier (e.g., "turn_started", "segment_committed").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl StoryLogEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording transcript events.
///
/// `log` is synchronous and infallible so a broken transcript file never
/// disturbs a turn; implementations swallow their own I/O errors.
pub trait StoryLogger: Send + Sync {
    fn log(&self, event: StoryLogEvent);
}

/// No-op implementation for tests and when transcripts are disabled.
pub struct NoStoryLogger;

impl StoryLogger for NoStoryLogger {
    fn log(&self, _event: StoryLogEvent) {}
}

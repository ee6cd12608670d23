//! Domain layer for story-weaver
//!
//! This crate contains the story entities, provider-payload validation and
//! the turn state machine. It has no dependencies on infrastructure or
//! presentation concerns.
//!
//! # Core Concepts
//!
//! - **Story session**: one playthrough, from the opening scene to reset
//! - **Turn**: one user action (start or choose) and its provider round-trip
//! - **Segment**: one displayed narrative beat with its illustration
//! - **Choice set**: exactly three options offered after each segment

pub mod config;
pub mod core;
pub mod prompt;
pub mod story;

// Re-export commonly used types
pub use config::OutputFormat;
pub use core::{error::DomainError, opening::OpeningScene};
pub use prompt::StoryPrompt;
pub use story::{
    entities::{CHOICE_COUNT, ChoiceSet, ImageRef, StorySegment},
    payload::StoryBeat,
    state::{
        StoryAction, StorySnapshot, StoryState, StoryStatus, TransitionError, TurnKind,
    },
};

//! Application layer for story-weaver
//!
//! This crate contains the turn orchestrator, the provider and observer port
//! definitions, and application configuration. It depends only on the
//! domain layer.

pub mod config;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use config::BehaviorConfig;
pub use ports::{
    story_gateway::{
        GatewayError, IllustrationGateway, NarrativeGateway, NarrativeSession, SessionBrief,
    },
    story_logger::{NoStoryLogger, StoryLogEvent, StoryLogger},
    story_observer::{CompositeObserver, ErrorCategory, NoStoryObserver, StoryEvent, StoryObserver},
};
pub use use_cases::orchestrator::StoryOrchestrator;
pub use use_cases::round_trip::{TurnError, TurnResult, run_round_trip};

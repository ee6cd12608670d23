//! Story event port
//!
//! Events emitted by the orchestrator on every transition. Renderers,
//! spinners and the feedback cue channel subscribe to these independently;
//! none of them can change story state.

use serde::Serialize;
use std::sync::Arc;
use weaver_domain::{StorySegment, TurnKind};

/// Which side of the error taxonomy a failed turn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Blank input or a malformed/incomplete story payload
    Validation,
    /// Transport, auth, quota or timeout failure of either provider call
    Provider,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Validation => write!(f, "validation"),
            ErrorCategory::Provider => write!(f, "provider"),
        }
    }
}

/// Transition notifications published by the orchestrator
#[derive(Debug, Clone, PartialEq)]
pub enum StoryEvent {
    /// A new session was created by `start`
    SessionStarted,
    /// A provider round-trip has been issued
    TurnStarted { kind: TurnKind },
    /// The reader picked the next turn's input
    ChoiceSelected { choice: String },
    /// A turn committed a new segment
    SegmentArrived {
        segment: StorySegment,
        choices: Vec<String>,
    },
    /// A turn failed and the story is now errored
    TurnFailed {
        kind: TurnKind,
        category: ErrorCategory,
        message: String,
    },
    /// `start` was refused locally (blank opening scene)
    OpeningRejected { message: String },
    /// The session was discarded by `reset`
    SessionEnded,
}

/// Subscriber to story transitions.
///
/// Called synchronously after the transition is committed. Implementations
/// must be quick and must not call back into the orchestrator's turn
/// methods.
pub trait StoryObserver: Send + Sync {
    fn on_event(&self, event: &StoryEvent);
}

/// No-op observer
pub struct NoStoryObserver;

impl StoryObserver for NoStoryObserver {
    fn on_event(&self, _event: &StoryEvent) {}
}

/// Fans one event out to several observers, in registration order
#[derive(Default, Clone)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn StoryObserver>>,
}

impl CompositeObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, observer: Arc<dyn StoryObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn push(&mut self, observer: Arc<dyn StoryObserver>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl StoryObserver for CompositeObserver {
    fn on_event(&self, event: &StoryEvent) {
        for observer in &self.observers {
            observer.on_event(event);
        }
    }
}

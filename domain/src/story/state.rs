//! Story session state machine.
//!
//! [`StoryState`] owns the pure, synchronous part of a story session: which
//! user actions are allowed right now, the append-only history, the live
//! choices and the last error. It knows nothing about providers; the
//! application layer drives it around each provider round-trip.
//!
//! ```text
//!            start                    commit
//!   Idle ───────────▶ TurnInFlight ───────────▶ AwaitingChoice
//!    ▲                   │      ▲                     │
//!    │                   │ fail └──────── choose ─────┘
//!    │                   ▼
//!    └──── reset ──── Errored      (reset is valid from every state)
//! ```

use super::entities::{ChoiceSet, ImageRef, StorySegment};
use super::payload::StoryBeat;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle status of a story session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoryStatus {
    /// No session, waiting for an opening scene
    #[default]
    Idle,
    /// A provider round-trip is pending
    TurnInFlight,
    /// A segment is displayed and three choices are live
    AwaitingChoice,
    /// The last turn failed; prior history is still displayed
    Errored,
}

impl StoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoryStatus::Idle => "idle",
            StoryStatus::TurnInFlight => "turn in flight",
            StoryStatus::AwaitingChoice => "awaiting choice",
            StoryStatus::Errored => "errored",
        }
    }
}

impl std::fmt::Display for StoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What kind of user action a turn came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    /// `start(openingText)`
    Opening,
    /// `choose(choiceText)`
    Choice,
}

impl TurnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnKind::Opening => "opening",
            TurnKind::Choice => "choice",
        }
    }
}

impl std::fmt::Display for TurnKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user action the state machine may refuse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryAction {
    Start,
    Choose,
    Commit,
    Fail,
}

impl std::fmt::Display for StoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoryAction::Start => "start a story",
            StoryAction::Choose => "choose",
            StoryAction::Commit => "commit a segment",
            StoryAction::Fail => "fail a turn",
        };
        write!(f, "{}", name)
    }
}

/// Refusal of a transition. The state is left untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("A turn is already in progress")]
    TurnInFlight,

    #[error("Cannot {action} while the story is {status}")]
    NotAllowed {
        action: StoryAction,
        status: StoryStatus,
    },
}

/// Read-only copy of a story session for renderers and subscribers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySnapshot {
    pub status: StoryStatus,
    /// True once the opening segment has been committed
    pub started: bool,
    pub history: Vec<StorySegment>,
    /// Exactly three entries while awaiting a choice, empty otherwise
    pub choices: Vec<String>,
    pub error: Option<String>,
}

impl StorySnapshot {
    pub fn is_busy(&self) -> bool {
        self.status == StoryStatus::TurnInFlight
    }

    pub fn latest_segment(&self) -> Option<&StorySegment> {
        self.history.last()
    }
}

/// State machine for one story session (Aggregate)
#[derive(Debug, Clone, Default)]
pub struct StoryState {
    status: StoryStatus,
    started: bool,
    pending: Option<TurnKind>,
    history: Vec<StorySegment>,
    choices: Option<ChoiceSet>,
    error: Option<String>,
}

impl StoryState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> StoryStatus {
        self.status
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn pending_turn(&self) -> Option<TurnKind> {
        self.pending
    }

    pub fn history(&self) -> &[StorySegment] {
        &self.history
    }

    pub fn choices(&self) -> Option<&ChoiceSet> {
        self.choices.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether `start` is currently allowed.
    ///
    /// Besides `Idle`, a failed opening may be retried: it never produced a
    /// segment, so there is nothing on screen to lose.
    pub fn can_start(&self) -> bool {
        match self.status {
            StoryStatus::Idle => true,
            StoryStatus::Errored => !self.started,
            StoryStatus::TurnInFlight | StoryStatus::AwaitingChoice => false,
        }
    }

    /// Check that `start` may run, without changing anything
    pub fn check_start(&self) -> Result<(), TransitionError> {
        if self.status == StoryStatus::TurnInFlight {
            return Err(TransitionError::TurnInFlight);
        }
        if !self.can_start() {
            return Err(self.not_allowed(StoryAction::Start));
        }
        Ok(())
    }

    /// Record a locally rejected opening scene; no provider was contacted.
    pub fn reject_opening(&mut self, error: &DomainError) -> Result<(), TransitionError> {
        self.check_start()?;
        self.status = StoryStatus::Idle;
        self.started = false;
        self.error = Some(error.to_string());
        Ok(())
    }

    /// Enter `TurnInFlight` for a brand-new session
    pub fn begin_opening(&mut self) -> Result<(), TransitionError> {
        self.check_start()?;
        *self = Self {
            status: StoryStatus::TurnInFlight,
            pending: Some(TurnKind::Opening),
            ..Self::default()
        };
        Ok(())
    }

    /// Enter `TurnInFlight` for a choice, clearing the stale choices first
    pub fn begin_choice(&mut self) -> Result<(), TransitionError> {
        match self.status {
            StoryStatus::AwaitingChoice => {}
            StoryStatus::TurnInFlight => return Err(TransitionError::TurnInFlight),
            _ => return Err(self.not_allowed(StoryAction::Choose)),
        }
        self.choices = None;
        self.error = None;
        self.pending = Some(TurnKind::Choice);
        self.status = StoryStatus::TurnInFlight;
        Ok(())
    }

    /// Complete the pending turn: append the next segment and install its choices.
    pub fn commit(
        &mut self,
        beat: StoryBeat,
        image: ImageRef,
    ) -> Result<StorySegment, TransitionError> {
        if self.status != StoryStatus::TurnInFlight {
            return Err(self.not_allowed(StoryAction::Commit));
        }
        let (story, choices) = beat.into_parts();
        let segment = StorySegment::new(self.history.len() + 1, story, image);

        self.history.push(segment.clone());
        self.choices = Some(choices);
        self.started = true;
        self.pending = None;
        self.error = None;
        self.status = StoryStatus::AwaitingChoice;
        Ok(segment)
    }

    /// Fail the pending turn.
    ///
    /// History is preserved as-is. A failed opening leaves the session
    /// unstarted so the next `start` builds an entirely new one.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.status != StoryStatus::TurnInFlight {
            return Err(self.not_allowed(StoryAction::Fail));
        }
        if self.pending == Some(TurnKind::Opening) {
            self.started = false;
            self.history.clear();
        }
        self.choices = None;
        self.pending = None;
        self.error = Some(message.into());
        self.status = StoryStatus::Errored;
        Ok(())
    }

    /// Drop everything and return to `Idle`. Valid from every state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> StorySnapshot {
        StorySnapshot {
            status: self.status,
            started: self.started,
            history: self.history.clone(),
            choices: self.choices.as_ref().map(ChoiceSet::to_vec).unwrap_or_default(),
            error: self.error.clone(),
        }
    }

    fn not_allowed(&self, action: StoryAction) -> TransitionError {
        TransitionError::NotAllowed {
            action,
            status: self.status,
        }
    }
}

//! Combined provider round-trip.
//!
//! One turn = advance the narrator, validate its payload, then illustrate
//! the validated story text. The three steps are strictly sequential (the
//! image prompt depends on the narrative) and the caller only ever sees the
//! complete result or an error.

use crate::config::BehaviorConfig;
use crate::ports::story_gateway::{GatewayError, IllustrationGateway, NarrativeSession};
use crate::ports::story_observer::ErrorCategory;
use thiserror::Error;
use tracing::{debug, warn};
use weaver_domain::core::string::preview;
use weaver_domain::{DomainError, ImageRef, StoryBeat, StoryPrompt, TransitionError};

/// Errors returned by the turn use cases
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// Blank opening scene, or a malformed/incomplete story payload
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Either provider call failed
    #[error(transparent)]
    Provider(#[from] GatewayError),

    /// The action is not valid in the current state; nothing changed
    #[error(transparent)]
    Rejected(#[from] TransitionError),

    /// The session was reset while this turn was in flight; its result was dropped
    #[error("The story was reset before this turn finished")]
    Abandoned,
}

impl TurnError {
    /// Taxonomy of failures that move the story to `Errored`.
    ///
    /// `None` for refusals and abandoned turns, which leave state untouched.
    pub fn category(&self) -> Option<ErrorCategory> {
        match self {
            TurnError::Validation(_) => Some(ErrorCategory::Validation),
            TurnError::Provider(_) => Some(ErrorCategory::Provider),
            TurnError::Rejected(_) | TurnError::Abandoned => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, TurnError::Validation(_))
    }

    pub fn is_provider(&self) -> bool {
        matches!(self, TurnError::Provider(_))
    }
}

/// Atomic result of a successful round-trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub beat: StoryBeat,
    pub image: ImageRef,
}

/// Advance the narrative, validate it, then render its illustration.
///
/// A failure at any step discards everything produced so far.
pub async fn run_round_trip(
    session: &mut dyn NarrativeSession,
    illustrator: &dyn IllustrationGateway,
    behavior: &BehaviorConfig,
    message: &str,
) -> Result<TurnResult, TurnError> {
    debug!(message = %preview(message, 80), "Advancing narrative");
    let raw = behavior.bound(session.advance(message)).await?;

    let beat = StoryBeat::parse(&raw).inspect_err(|e| {
        warn!(
            detail = e.detail(),
            raw = %preview(&raw, 200),
            "Rejected narrative payload"
        );
    })?;

    let prompt = StoryPrompt::illustration_prompt(beat.story());
    debug!(prompt = %preview(&prompt, 80), "Rendering illustration");
    let image = behavior.bound(illustrator.render_image(&prompt)).await?;

    Ok(TurnResult { beat, image })
}

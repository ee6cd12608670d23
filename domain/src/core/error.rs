//! Domain error types

use thiserror::Error;

/// Validation errors raised by the domain.
///
/// Every variant is a *validation* failure: either the user gave us nothing
/// to work with, or the narrative provider answered with something that is
/// not a story beat. Transport failures live in the application layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Please describe an opening scene to begin your story.")]
    EmptyOpeningScene,

    /// The payload was not JSON, or its fields had the wrong types.
    #[error("The AI returned an unexpected story format. Please try again.")]
    UnexpectedFormat(String),

    /// The payload parsed but does not describe a usable story beat.
    #[error("Invalid story structure received from AI: {0}")]
    InvalidStructure(String),
}

impl DomainError {
    /// Whether this error came from a provider payload rather than user input
    pub fn is_payload_error(&self) -> bool {
        matches!(
            self,
            DomainError::UnexpectedFormat(_) | DomainError::InvalidStructure(_)
        )
    }

    /// Diagnostic detail for logs (the Display text is meant for users)
    pub fn detail(&self) -> &str {
        match self {
            DomainError::EmptyOpeningScene => "opening scene is blank",
            DomainError::UnexpectedFormat(detail) | DomainError::InvalidStructure(detail) => {
                detail
            }
        }
    }
}

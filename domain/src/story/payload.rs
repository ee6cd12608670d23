//! Validation of narrative-provider payloads.
//!
//! The provider is asked for `{"story": string, "choices": [string, string, string]}`
//! but may answer with anything. [`StoryBeat::parse`] is the single gate
//! between raw provider text and the state machine.

use super::entities::ChoiceSet;
use crate::core::error::DomainError;
use serde::Deserialize;

/// Wire shape of the structured story response.
///
/// Fields are optional so that a missing field is reported as a structure
/// problem, not as a JSON syntax problem.
#[derive(Debug, Deserialize)]
struct RawStoryPayload {
    story: Option<String>,
    choices: Option<Vec<String>>,
}

/// A validated story beat: narrative text plus exactly three choices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryBeat {
    story: String,
    choices: ChoiceSet,
}

impl StoryBeat {
    /// Parse and validate a raw provider response.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let json = strip_code_fence(raw.trim());

        let payload: RawStoryPayload = serde_json::from_str(json)
            .map_err(|e| DomainError::UnexpectedFormat(e.to_string()))?;

        let story = match payload.story {
            Some(story) if !story.trim().is_empty() => story,
            Some(_) => return Err(invalid("story text is empty")),
            None => return Err(invalid("missing story text")),
        };

        let choices = payload
            .choices
            .ok_or_else(|| invalid("missing choices"))?;

        let choices = ChoiceSet::try_from(choices)?;

        Ok(Self { story, choices })
    }

    pub fn story(&self) -> &str {
        &self.story
    }

    pub fn choices(&self) -> &ChoiceSet {
        &self.choices
    }

    pub fn into_parts(self) -> (String, ChoiceSet) {
        (self.story, self.choices)
    }
}

pub(crate) fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::InvalidStructure(detail.into())
}

/// Remove a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return text;
    };
    // Drop the info string ("json") on the opening fence line
    match body.split_once('\n') {
        Some((_, inner)) => inner.trim(),
        None => body.trim(),
    }
}

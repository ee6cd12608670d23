//! Opening scene value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// The user's description of where the story begins (Value Object)
///
/// Always contains at least one non-whitespace character. The text is kept
/// exactly as typed; only the emptiness check looks at the trimmed form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OpeningScene {
    content: String,
}

impl OpeningScene {
    /// Validate and wrap an opening scene description
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            return Err(DomainError::EmptyOpeningScene);
        }
        Ok(Self { content })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}

impl TryFrom<String> for OpeningScene {
    type Error = DomainError;

    fn try_from(content: String) -> Result<Self, Self::Error> {
        Self::try_new(content)
    }
}

impl From<OpeningScene> for String {
    fn from(scene: OpeningScene) -> Self {
        scene.content
    }
}

impl std::fmt::Display for OpeningScene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

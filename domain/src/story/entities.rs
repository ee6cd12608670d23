//! Story domain entities

use super::payload::invalid;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Number of choices offered after every segment
pub const CHOICE_COUNT: usize = 3;

/// Opaque reference to a rendered illustration (Value Object)
///
/// For the Gemini adapter this is a `data:` URL carrying the image bytes,
/// but nothing outside infrastructure looks inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(String);

impl ImageRef {
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// MIME type when the reference is a `data:` URL
    pub fn data_mime_type(&self) -> Option<&str> {
        let rest = self.0.strip_prefix("data:")?;
        let (mime, _) = rest.split_once(';')?;
        Some(mime)
    }
}

impl std::fmt::Display for ImageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One rendered beat of the narrative (Entity)
///
/// Positions are assigned by the state machine, starting at 1, and never
/// come from the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorySegment {
    position: usize,
    text: String,
    image: ImageRef,
}

impl StorySegment {
    pub(crate) fn new(position: usize, text: String, image: ImageRef) -> Self {
        Self {
            position,
            text,
            image,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }
}

/// The three options offered to the reader (Value Object)
///
/// Every constructor, deserialization included, goes through
/// `TryFrom<Vec<String>>`, so holding a `ChoiceSet` means holding three
/// distinct, non-blank choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>")]
pub struct ChoiceSet([String; CHOICE_COUNT]);

impl TryFrom<Vec<String>> for ChoiceSet {
    type Error = DomainError;

    fn try_from(choices: Vec<String>) -> Result<Self, Self::Error> {
        let choices: [String; CHOICE_COUNT] = choices.try_into().map_err(|c: Vec<String>| {
            invalid(format!("expected {} choices, got {}", CHOICE_COUNT, c.len()))
        })?;

        if choices.iter().any(|c| c.trim().is_empty()) {
            return Err(invalid("a choice is empty"));
        }

        let distinct: HashSet<&str> = choices.iter().map(|c| c.trim()).collect();
        if distinct.len() != CHOICE_COUNT {
            return Err(invalid("choices are not distinct"));
        }

        Ok(Self(choices))
    }
}

impl ChoiceSet {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Zero-based lookup
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.to_vec()
    }
}

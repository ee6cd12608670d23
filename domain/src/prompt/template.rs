//! Prompt templates for the story flow

use crate::core::opening::OpeningScene;
use crate::story::entities::CHOICE_COUNT;
use serde_json::{Value, json};

/// Templates for the narrator session and the illustrator
pub struct StoryPrompt;

impl StoryPrompt {
    /// System instruction installed once per session
    pub fn system_instruction() -> &'static str {
        r#"You are an expert storyteller creating an interactive story. Your task is to narrate a compelling story, and at the end of each narration, you must provide the user with three distinct choices to guide the story's direction.

Rules:
1. Always begin the story in a captivating, unexpected setting based on the user's prompt.
2. Each story segment should be a short paragraph, about 3-4 sentences long.
3. After each story segment, you MUST provide three distinct choices.
4. The choices must be different from each other and lead to meaningful branches in the story.
5. Your entire response MUST be a valid JSON object matching the provided schema. Do not include any text outside of the JSON structure."#
    }

    /// Structured-output schema (OpenAPI subset, as Gemini expects it)
    pub fn response_schema() -> Value {
        json!({
            "type": "OBJECT",
            "properties": {
                "story": {
                    "type": "STRING",
                    "description": "A short paragraph of a story, about 3-4 sentences."
                },
                "choices": {
                    "type": "ARRAY",
                    "description": "Exactly three distinct choices for the user to continue the story.",
                    "items": { "type": "STRING" },
                    "minItems": CHOICE_COUNT,
                    "maxItems": CHOICE_COUNT
                }
            },
            "required": ["story", "choices"]
        })
    }

    /// First message of a session
    pub fn opening_message(scene: &OpeningScene) -> String {
        format!("Start the story with this scene: {}", scene.content())
    }

    /// Prompt for the illustration of a segment
    pub fn illustration_prompt(story: &str) -> String {
        format!(
            "Cinematic, digital painting, detailed illustration, atmospheric. {}",
            story
        )
    }

    /// Ready-made opening scenes offered to users who don't have one
    pub fn suggestions() -> &'static [&'static str] {
        &[
            "A lone lighthouse keeper on a stormy, alien planet.",
            "A detective discovers a magical secret in 1920s New Orleans.",
            "Two rival starship captains are stranded on a lush, unexplored world.",
        ]
    }
}

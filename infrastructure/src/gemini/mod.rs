//! Gemini adapter
//!
//! Implements the narrator and illustrator ports over the Gemini REST API:
//! `generateContent` with structured JSON output for the story, Imagen
//! `predict` for the illustrations.

pub mod client;
pub mod error;
pub mod gateway;
pub mod protocol;
pub mod session;

pub use client::{DEFAULT_API_KEY_ENV, DEFAULT_BASE_URL, GeminiClient, GeminiSettings};
pub use error::GeminiError;
pub use gateway::GeminiGateway;
pub use session::GeminiStorySession;

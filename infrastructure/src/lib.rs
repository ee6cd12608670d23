//! Infrastructure layer for story-weaver
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer:
//!
//! - [`gemini`]: narrator and illustrator over the Gemini REST API
//! - [`config`]: TOML + environment configuration loading
//! - [`logging`]: JSONL story transcripts
//! - [`images`]: saving illustrations to disk

pub mod config;
pub mod gemini;
pub mod images;
pub mod logging;

pub use config::{ConfigLoader, ConfigValidationError, FileConfig};
pub use gemini::{GeminiError, GeminiGateway, GeminiSettings};
pub use images::ImageExporter;
pub use logging::JsonlStoryLogger;

//! Illustration export
//!
//! Saves every committed segment's illustration to disk.

mod exporter;

pub use exporter::{ImageExportError, ImageExporter};

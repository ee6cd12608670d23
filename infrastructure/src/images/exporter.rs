//! Writes data-URL illustrations as image files.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, info, warn};
use weaver_application::{StoryEvent, StoryObserver};
use weaver_domain::{ImageRef, StorySegment};

#[derive(Error, Debug)]
pub enum ImageExportError {
    #[error("image reference is not a base64 data URL")]
    NotDataUrl,

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Observer that saves each new segment's image.
///
/// Files are named `<run>-story<k>-segment-<n>.<ext>`: `run` is the launch
/// time and `k` counts stories started in this run, so a reset never
/// overwrites an earlier story's frames.
pub struct ImageExporter {
    dir: PathBuf,
    run: String,
    story: AtomicUsize,
}

impl ImageExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_run_label(dir, chrono::Local::now().format("%Y%m%d-%H%M%S").to_string())
    }

    /// Exporter whose file names start with `run` instead of the launch time
    pub fn with_run_label(dir: impl Into<PathBuf>, run: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            run: run.into(),
            story: AtomicUsize::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Decode and write one segment's illustration, returning the file path
    pub fn export(&self, segment: &StorySegment) -> Result<PathBuf, ImageExportError> {
        let (path, bytes) = self.prepare(segment)?;
        write_image(&self.dir, &path, &bytes)?;
        Ok(path)
    }

    fn prepare(&self, segment: &StorySegment) -> Result<(PathBuf, Vec<u8>), ImageExportError> {
        let (mime, bytes) = decode_data_url(segment.image())?;
        let name = format!(
            "{}-story{}-segment-{}.{}",
            self.run,
            self.story.load(Ordering::SeqCst),
            segment.position(),
            extension(mime)
        );
        Ok((self.dir.join(name), bytes))
    }
}

impl StoryObserver for ImageExporter {
    fn on_event(&self, event: &StoryEvent) {
        let segment = match event {
            StoryEvent::SessionStarted => {
                self.story.fetch_add(1, Ordering::SeqCst);
                return;
            }
            StoryEvent::SegmentArrived { segment, .. } => segment,
            _ => return,
        };

        let (path, bytes) = match self.prepare(segment) {
            Ok(prepared) => prepared,
            Err(ImageExportError::NotDataUrl) => {
                debug!(position = segment.position(), "Illustration is not inline data; skipped");
                return;
            }
            Err(e) => {
                warn!(position = segment.position(), "Could not save illustration: {}", e);
                return;
            }
        };

        // Observers run on the turn's task; keep disk I/O off the async workers.
        let dir = self.dir.clone();
        let save = move || match write_image(&dir, &path, &bytes) {
            Ok(()) => info!(path = %path.display(), "Illustration saved"),
            Err(e) => warn!("Could not save illustration: {}", e),
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(save);
            }
            Err(_) => save(),
        }
    }
}

fn write_image(dir: &Path, path: &Path, bytes: &[u8]) -> Result<(), ImageExportError> {
    std::fs::create_dir_all(dir)
        .and_then(|_| std::fs::write(path, bytes))
        .map_err(|source| ImageExportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

/// Split `data:<mime>;base64,<payload>` into the MIME type and decoded bytes
fn decode_data_url(image: &ImageRef) -> Result<(&str, Vec<u8>), ImageExportError> {
    let mime = image.data_mime_type().ok_or(ImageExportError::NotDataUrl)?;
    let payload = image
        .as_str()
        .split_once(";base64,")
        .map(|(_, payload)| payload)
        .ok_or(ImageExportError::NotDataUrl)?;
    Ok((mime, STANDARD.decode(payload)?))
}

fn extension(mime: &str) -> &'static str {
    match mime {
        "image/jpeg" | "image/jpg" => "jpg",
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "bin",
    }
}

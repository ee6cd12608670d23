//! Spinner shown while the narrator and illustrator are working

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use weaver_application::{StoryEvent, StoryObserver};
use weaver_domain::TurnKind;

/// Shows a spinner from `TurnStarted` until the turn settles
pub struct TurnSpinner {
    target: fn() -> ProgressDrawTarget,
    bar: Mutex<Option<ProgressBar>>,
}

impl TurnSpinner {
    pub fn new() -> Self {
        Self {
            target: ProgressDrawTarget::stderr,
            bar: Mutex::new(None),
        }
    }

    /// A spinner that tracks turns without drawing anything
    pub fn hidden() -> Self {
        Self {
            target: ProgressDrawTarget::hidden,
            bar: Mutex::new(None),
        }
    }

    /// Whether a spinner is currently running
    pub fn is_active(&self) -> bool {
        self.lock_bar().is_some()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner:.magenta} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn message(kind: TurnKind) -> &'static str {
        match kind {
            TurnKind::Opening => "Weaving the opening scene...",
            TurnKind::Choice => "Weaving what happens next...",
        }
    }

    fn start(&self, kind: TurnKind) {
        let bar = ProgressBar::with_draw_target(None, (self.target)());
        bar.set_style(Self::spinner_style());
        bar.set_message(Self::message(kind));
        bar.enable_steady_tick(Duration::from_millis(100));

        if let Some(previous) = self.lock_bar().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn finish(&self, note: Option<String>) {
        if let Some(bar) = self.lock_bar().take() {
            match note {
                Some(note) => bar.abandon_with_message(note),
                None => bar.finish_and_clear(),
            }
        }
    }

    fn lock_bar(&self) -> MutexGuard<'_, Option<ProgressBar>> {
        self.bar.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for TurnSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl StoryObserver for TurnSpinner {
    fn on_event(&self, event: &StoryEvent) {
        match event {
            StoryEvent::TurnStarted { kind } => self.start(*kind),
            StoryEvent::SegmentArrived { .. } | StoryEvent::SessionEnded => self.finish(None),
            StoryEvent::TurnFailed { category, .. } => {
                self.finish(Some(format!("{} {} failure", "x".red(), category)))
            }
            StoryEvent::SessionStarted
            | StoryEvent::ChoiceSelected { .. }
            | StoryEvent::OpeningRejected { .. } => {}
        }
    }
}

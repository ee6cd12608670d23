//! Cue selection and terminal playback

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;
use weaver_application::{StoryEvent, StoryObserver};

/// A feedback cue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    /// A new story was started
    Start,
    /// The reader picked a choice
    Click,
    /// A segment after the opening arrived
    NewSegment,
    /// The story was reset
    End,
    /// A turn failed
    Error,
}

impl Cue {
    pub fn as_str(&self) -> &'static str {
        match self {
            Cue::Start => "start",
            Cue::Click => "click",
            Cue::NewSegment => "new_segment",
            Cue::End => "end",
            Cue::Error => "error",
        }
    }

    /// Bell pattern written to the terminal
    pub fn bells(&self) -> &'static str {
        match self {
            Cue::Start | Cue::Click | Cue::NewSegment => "\x07",
            Cue::End => "\x07\x07",
            Cue::Error => "\x07\x07\x07",
        }
    }

    /// Cue for a story event, if it has one.
    ///
    /// The opening segment gets no cue of its own: `Start` already
    /// announced it.
    pub fn for_event(event: &StoryEvent) -> Option<Cue> {
        match event {
            StoryEvent::SessionStarted => Some(Cue::Start),
            StoryEvent::ChoiceSelected { .. } => Some(Cue::Click),
            StoryEvent::SegmentArrived { segment, .. } if segment.position() > 1 => {
                Some(Cue::NewSegment)
            }
            StoryEvent::SessionEnded => Some(Cue::End),
            StoryEvent::TurnFailed { .. } => Some(Cue::Error),
            StoryEvent::SegmentArrived { .. }
            | StoryEvent::TurnStarted { .. }
            | StoryEvent::OpeningRejected { .. } => None,
        }
    }

    /// Events that come straight from a reader action
    fn is_user_triggered(event: &StoryEvent) -> bool {
        matches!(
            event,
            StoryEvent::SessionStarted
                | StoryEvent::ChoiceSelected { .. }
                | StoryEvent::OpeningRejected { .. }
        )
    }
}

/// Plays cues. Must never fail or block for long.
pub trait CuePlayer: Send + Sync {
    fn play(&self, cue: Cue);
}

/// Rings the terminal bell on stderr
pub struct TerminalBell;

impl CuePlayer for TerminalBell {
    fn play(&self, cue: Cue) {
        let mut stderr = std::io::stderr().lock();
        let _ = stderr.write_all(cue.bells().as_bytes());
        let _ = stderr.flush();
    }
}

/// Observer that maps story events to cues.
///
/// Stays silent until the first reader action arms it, so a reset issued
/// before any story was started plays nothing.
pub struct FeedbackCues<P: CuePlayer> {
    player: P,
    armed: AtomicBool,
}

impl<P: CuePlayer> FeedbackCues<P> {
    pub fn new(player: P) -> Self {
        Self {
            player,
            armed: AtomicBool::new(false),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }
}

impl FeedbackCues<TerminalBell> {
    pub fn terminal() -> Self {
        Self::new(TerminalBell)
    }
}

impl<P: CuePlayer> StoryObserver for FeedbackCues<P> {
    fn on_event(&self, event: &StoryEvent) {
        if Cue::is_user_triggered(event) {
            self.armed.store(true, Ordering::SeqCst);
        }
        if !self.is_armed() {
            return;
        }
        if let Some(cue) = Cue::for_event(event) {
            debug!(cue = cue.as_str(), "Feedback cue");
            self.player.play(cue);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use weaver_application::ErrorCategory;
    use weaver_domain::{ImageRef, StoryBeat, StorySegment, StoryState, TurnKind};

    #[derive(Clone, Default)]
    struct RecordingPlayer {
        played: Arc<Mutex<Vec<Cue>>>,
    }

    impl CuePlayer for RecordingPlayer {
        fn play(&self, cue: Cue) {
            self.played.lock().unwrap().push(cue);
        }
    }

    fn segments(count: usize) -> Vec<StorySegment> {
        let mut state = StoryState::new();
        let mut out = Vec::new();
        for i in 0..count {
            if i == 0 {
                state.begin_opening().unwrap();
            } else {
                state.begin_choice().unwrap();
            }
            let beat = StoryBeat::parse(r#"{"story":"s","choices":["a","b","c"]}"#).unwrap();
            out.push(state.commit(beat, ImageRef::new("img")).unwrap());
        }
        out
    }

    fn arrived(segment: StorySegment) -> StoryEvent {
        StoryEvent::SegmentArrived {
            segment,
            choices: vec!["a".into(), "b".into(), "c".into()],
        }
    }

    #[test]
    fn test_cue_sequence_for_a_short_story() {
        let player = RecordingPlayer::default();
        let cues = FeedbackCues::new(player.clone());
        let segs = segments(2);

        cues.on_event(&StoryEvent::SessionStarted);
        cues.on_event(&StoryEvent::TurnStarted {
            kind: TurnKind::Opening,
        });
        cues.on_event(&arrived(segs[0].clone()));
        cues.on_event(&StoryEvent::ChoiceSelected { choice: "a".into() });
        cues.on_event(&arrived(segs[1].clone()));
        cues.on_event(&StoryEvent::TurnFailed {
            kind: TurnKind::Choice,
            category: ErrorCategory::Provider,
            message: "boom".into(),
        });
        cues.on_event(&StoryEvent::SessionEnded);

        assert_eq!(
            *player.played.lock().unwrap(),
            vec![Cue::Start, Cue::Click, Cue::NewSegment, Cue::Error, Cue::End]
        );
    }

    #[test]
    fn test_silent_until_armed() {
        let player = RecordingPlayer::default();
        let cues = FeedbackCues::new(player.clone());

        cues.on_event(&StoryEvent::SessionEnded);
        assert!(!cues.is_armed());
        assert!(player.played.lock().unwrap().is_empty());

        cues.on_event(&StoryEvent::OpeningRejected {
            message: "Please describe an opening scene to begin your story.".into(),
        });
        assert!(cues.is_armed());
        cues.on_event(&StoryEvent::SessionEnded);
        assert_eq!(*player.played.lock().unwrap(), vec![Cue::End]);
    }

    #[test]
    fn test_opening_segment_has_no_cue() {
        let segs = segments(1);
        assert_eq!(Cue::for_event(&arrived(segs[0].clone())), None);
    }
}

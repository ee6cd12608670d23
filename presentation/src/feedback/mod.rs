//! Feedback side-channel
//!
//! Short cues played on story transitions. Cues only observe; they never
//! touch story state.

mod cues;

pub use cues::{Cue, CuePlayer, FeedbackCues, TerminalBell};

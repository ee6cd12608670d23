//! Story domain.
//!
//! - [`entities::StorySegment`]: one displayed narrative beat with its illustration
//! - [`entities::ChoiceSet`]: the three options offered after a segment
//! - [`payload::StoryBeat`]: a validated narrative-provider payload
//! - [`state::StoryState`]: the turn state machine of one story session

pub mod entities;
pub mod payload;
pub mod state;

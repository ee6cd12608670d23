//! Application-level configuration.
//!
//! - [`BehaviorConfig`]: limits applied to provider calls during a turn

pub mod behavior;

pub use behavior::BehaviorConfig;

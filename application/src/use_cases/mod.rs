//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod orchestrator;
pub mod round_trip;
#[cfg(test)]
pub(crate) mod testing;

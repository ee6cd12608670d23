//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure and presentation adapters
//! must implement.

pub mod story_gateway;
pub mod story_logger;
pub mod story_observer;

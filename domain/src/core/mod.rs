//! Core domain concepts shared across all subdomains.
//!
//! - [`opening::OpeningScene`]: a validated opening-scene description
//! - [`error::DomainError`]: validation errors for user input and provider payloads
//! - [`string`]: text helpers used for log previews

pub mod error;
pub mod opening;
pub mod string;

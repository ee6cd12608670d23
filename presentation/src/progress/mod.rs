//! Progress display while a turn is in flight

pub mod reporter;

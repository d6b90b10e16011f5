//! Domain models shared across crates.

pub mod model;
pub mod settings;

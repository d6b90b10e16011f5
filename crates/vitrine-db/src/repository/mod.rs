//! Repository modules — one per table.

pub mod models;
pub mod settings;

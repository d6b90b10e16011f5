//! API route modules.

pub mod auth;
pub mod cache;
pub mod diagnostics;
pub mod embed;
pub mod files;
pub mod health;
pub mod models;
pub mod settings;
pub mod transfer;
pub mod uploads;

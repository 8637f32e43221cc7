//! Shared helpers for the app layer

pub mod health;
pub mod logging;

//! # Market Entry Secrets App
//!
//! Inbound surfaces for the CRM mirror and checkout services.
//!
//! This crate contains:
//! - Commands (sync, checkout, health) shared by the HTTP routes and the CLI
//! - Application context (dependency injection)
//! - The axum router and the `mes` binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires the adapters into the core services

pub mod commands;
pub mod context;
pub mod server;
pub mod utils;

// Re-export for convenience
pub use commands::*;
pub use context::*;
pub use server::{router, serve, ApiError};

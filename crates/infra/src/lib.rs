//! # Market Entry Secrets Infrastructure
//!
//! Infrastructure implementations of core ports.
//!
//! This crate contains:
//! - Configuration loading (environment, `.env`, TOML/JSON files)
//! - The SQLite store (rusqlite + r2d2 pool) and the Supabase REST store
//! - The Lemlist source client and the Stripe checkout gateway
//! - HTTP client construction and error conversions
//! - The PID-file lock used by CLI sync runs
//!
//! ## Architecture
//! - Implements traits defined in `mes-core`
//! - Depends on `mes-domain` and `mes-core`
//! - Contains all "impure" code (I/O, network)

pub mod config;
pub mod database;
pub mod errors;
pub mod http;
pub mod instance_lock;
pub mod integrations;

// Re-export commonly used items
pub use database::*;
pub use errors::InfraError;
pub use http::*;
pub use instance_lock::*;
pub use integrations::*;

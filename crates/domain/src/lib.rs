//! # Market Entry Secrets Domain
//!
//! Business domain types for the Market Entry Secrets backend services.
//!
//! This crate contains:
//! - CRM mirror records (companies, contacts) and their upsert payloads
//! - Sync report and response envelope types
//! - Checkout request/session types
//! - Domain error types and Result definitions
//! - Configuration structures and constants
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
pub use utils::domain_name::normalize_domain;

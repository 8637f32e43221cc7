//! Contact sync job
//!
//! Mirrors companies and contacts from the external CRM into the local store,
//! linking contacts to companies on a best-effort basis.

pub mod linking;
pub mod pagination;
pub mod ports;
pub mod service;
pub mod transform;

pub use service::{ContactSyncService, SyncOptions};

//! # Market Entry Secrets Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Port interfaces (traits) for the CRM source, the mirror store and the
//!   payment gateway
//! - The contact sync job: pagination, record normalisation, company linking
//! - The checkout service
//!
//! ## Architecture Principles
//! - Only depends on `mes-domain`
//! - No database, HTTP, or platform code
//! - All external dependencies via traits

pub mod billing;
pub mod sync;

// Re-export specific items to avoid ambiguity
pub use billing::ports::{CheckoutGateway, CheckoutSessionParams, CreatedSession};
pub use billing::CheckoutService;
pub use sync::linking::{CompanyHints, CompanyIndex, LinkStrategy};
pub use sync::ports::{CrmSource, CrmStore, SourcePage};
pub use sync::{ContactSyncService, SyncOptions};

//! Application constants
//!
//! Centralized location for domain-level constants used throughout the
//! services.

// Source pagination
pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_MAX_PAGES: usize = 1000;

// Record normalisation
pub const UNKNOWN_COMPANY_NAME: &str = "Unknown";
pub const WWW_PREFIX: &str = "www.";

// Lemlist
pub const DEFAULT_LEMLIST_BASE_URL: &str = "https://api.lemlist.com/api";
pub const DEFAULT_LEMLIST_TIMEOUT_SECS: u64 = 30;

// Supabase tables mirrored by the contact sync
pub const DEFAULT_COMPANIES_TABLE: &str = "lemlist_companies";
pub const DEFAULT_CONTACTS_TABLE: &str = "lemlist_contacts";

// Stripe
pub const DEFAULT_STRIPE_BASE_URL: &str = "https://api.stripe.com/v1";

// Local storage
pub const DEFAULT_DB_PATH: &str = "mes.db";
pub const DEFAULT_DB_POOL_SIZE: u32 = 4;

// HTTP surface
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8787";

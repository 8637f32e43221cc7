//! Supabase store integration

pub mod store;

pub use store::SupabaseCrmStore;

//! SQLite store implementation

pub mod crm_repository;
pub mod manager;

pub use crm_repository::SqliteCrmStore;
pub use manager::{DbManager, SqliteConnection, SqlitePool};

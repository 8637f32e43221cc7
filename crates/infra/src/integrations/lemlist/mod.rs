//! Lemlist CRM integration

pub mod client;
pub mod types;

pub use client::LemlistClient;

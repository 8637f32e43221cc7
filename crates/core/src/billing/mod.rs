//! Hosted checkout sessions

pub mod ports;
pub mod service;

pub use service::CheckoutService;

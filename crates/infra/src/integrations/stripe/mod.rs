//! Stripe payment integration

pub mod client;

pub use client::StripeCheckoutGateway;

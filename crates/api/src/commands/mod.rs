//! Commands behind the HTTP routes and the CLI

mod checkout;
mod health;
mod sync;

pub use checkout::*;
pub use health::*;
pub use sync::*;

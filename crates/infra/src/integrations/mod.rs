//! External service integrations

pub mod lemlist;
pub mod stripe;
pub mod supabase;

pub use lemlist::LemlistClient;
pub use stripe::StripeCheckoutGateway;
pub use supabase::SupabaseCrmStore;

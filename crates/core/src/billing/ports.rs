//! Payment gateway port

use async_trait::async_trait;
use mes_domain::Result;

/// Everything the gateway needs to open one hosted checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSessionParams {
    pub price_id: String,
    /// Subscription when true, one-off payment otherwise.
    pub recurring: bool,
    pub quantity: u32,
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Session handle returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub id: String,
    pub url: Option<String>,
}

#[async_trait]
pub trait CheckoutGateway: Send + Sync {
    /// Create a session using the secret key of the selected payment mode.
    async fn create_session(
        &self,
        secret_key: &str,
        params: &CheckoutSessionParams,
    ) -> Result<CreatedSession>;
}

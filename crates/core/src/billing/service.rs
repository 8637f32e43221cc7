//! Checkout session creation
//!
//! The payment environment comes from `StripeConfig::mode` alone. The caller's
//! identity never selects test or live pricing.

use std::sync::Arc;

use mes_domain::{CheckoutRequest, CheckoutSession, MesError, Result, StripeConfig};
use tracing::{info, instrument};
use url::Url;

use super::ports::{CheckoutGateway, CheckoutSessionParams};

pub struct CheckoutService {
    gateway: Arc<dyn CheckoutGateway>,
    config: StripeConfig,
}

impl CheckoutService {
    pub fn new(gateway: Arc<dyn CheckoutGateway>, config: StripeConfig) -> Self {
        Self { gateway, config }
    }

    /// Create a hosted checkout session for `request.plan`.
    ///
    /// # Errors
    /// - `InvalidInput` for a blank plan, a non-http(s) redirect URL, a
    ///   malformed email or a plan with no price in the current mode
    /// - `Config` when the current mode has no secret key (no network call)
    /// - whatever the gateway reports
    #[instrument(skip(self, request), fields(plan = %request.plan, mode = %self.config.mode))]
    pub async fn create_session(&self, request: CheckoutRequest) -> Result<CheckoutSession> {
        validate(&request)?;

        let secret_key = self.config.secret_key().ok_or_else(|| {
            MesError::Config(format!("Stripe {} secret key is not configured", self.config.mode))
        })?;

        let plan = request.plan.trim();
        let price = self.config.plans().get(plan).ok_or_else(|| {
            MesError::InvalidInput(format!("Unknown plan '{plan}' for {} mode", self.config.mode))
        })?;

        let params = CheckoutSessionParams {
            price_id: price.price_id.clone(),
            recurring: price.recurring,
            quantity: 1,
            customer_email: request.customer_email.map(|e| e.trim().to_string()),
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        };

        let created = self.gateway.create_session(secret_key, &params).await?;
        info!(session_id = %created.id, "checkout session created");

        Ok(CheckoutSession { id: created.id, url: created.url, mode: self.config.mode })
    }
}

fn validate(request: &CheckoutRequest) -> Result<()> {
    if request.plan.trim().is_empty() {
        return Err(MesError::InvalidInput("plan is required".to_string()));
    }

    let urls = [("success_url", &request.success_url), ("cancel_url", &request.cancel_url)];
    for (field, value) in urls {
        let parsed = Url::parse(value.trim())
            .map_err(|e| MesError::InvalidInput(format!("{field} is not a valid URL: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(MesError::InvalidInput(format!("{field} must be an http(s) URL")));
        }
    }

    if let Some(email) = request.customer_email.as_deref() {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(MesError::InvalidInput(format!("invalid customer_email '{email}'")));
        }
    }

    Ok(())
}

//! Stripe hosted checkout gateway
//!
//! Sessions are created with a form-encoded `POST /v1/checkout/sessions`,
//! authenticated with the secret key of the active payment mode.

use async_trait::async_trait;
use mes_core::{CheckoutGateway, CheckoutSessionParams, CreatedSession};
use mes_domain::{MesError, Result};
use reqwest::Method;
use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

use crate::http::HttpClient;

pub struct StripeCheckoutGateway {
    http: HttpClient,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
}

impl StripeCheckoutGateway {
    pub fn new(base_url: &str) -> Result<Self> {
        Url::parse(base_url)
            .map_err(|e| MesError::Config(format!("invalid Stripe base URL '{base_url}': {e}")))?;

        Ok(Self { http: HttpClient::new()?, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl CheckoutGateway for StripeCheckoutGateway {
    #[instrument(skip_all, fields(price_id = %params.price_id, recurring = params.recurring))]
    async fn create_session(
        &self,
        secret_key: &str,
        params: &CheckoutSessionParams,
    ) -> Result<CreatedSession> {
        let request = self
            .http
            .request(Method::POST, format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(secret_key)
            .form(&session_form(params));

        let session: SessionResponse = self.http.send_json(request).await?;
        info!(session_id = %session.id, "checkout session created");

        Ok(CreatedSession { id: session.id, url: session.url })
    }
}

fn session_form(params: &CheckoutSessionParams) -> Vec<(&'static str, String)> {
    let mode = if params.recurring { "subscription" } else { "payment" };
    let mut form = vec![
        ("mode", mode.to_string()),
        ("line_items[0][price]", params.price_id.clone()),
        ("line_items[0][quantity]", params.quantity.to_string()),
        ("success_url", params.success_url.clone()),
        ("cancel_url", params.cancel_url.clone()),
    ];
    if let Some(email) = &params.customer_email {
        form.push(("customer_email", email.clone()));
    }
    form
}

//! Checkout session types
//!
//! The payment environment is always an explicit configuration input
//! (`PaymentMode`), never derived from who is checking out.

use serde::{Deserialize, Serialize};

/// Which Stripe environment to create sessions in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    #[default]
    Test,
    Live,
}

crate::impl_domain_enum_conversions!(PaymentMode {
    Test => "test",
    Live => "live",
});

/// Price configured for a plan in one payment mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPrice {
    pub price_id: String,
    /// Subscription price when true, one-off payment otherwise.
    #[serde(default = "default_recurring")]
    pub recurring: bool,
}

fn default_recurring() -> bool {
    true
}

/// Inbound checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub plan: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    pub success_url: String,
    pub cancel_url: String,
}

/// Created checkout session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: Option<String>,
    pub mode: PaymentMode,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_mode_defaults_to_test() {
        assert_eq!(PaymentMode::default(), PaymentMode::Test);
        assert_eq!("LIVE".parse::<PaymentMode>().unwrap(), PaymentMode::Live);
    }

    #[test]
    fn plan_price_defaults_to_recurring() {
        let price: PlanPrice = serde_json::from_str(r#"{"price_id":"price_123"}"#).unwrap();
        assert!(price.recurring);
    }
}

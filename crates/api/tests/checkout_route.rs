//! `POST /functions/v1/create-checkout` against a mock Stripe API.

mod support;

use serde_json::json;
use support::{post_json, setup_test_app, TestAppOptions};
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, ResponseTemplate};

const CHECKOUT_URI: &str = "/functions/v1/create-checkout";

fn request_body(plan: &str) -> serde_json::Value {
    json!({
        "plan": plan,
        "customer_email": "founder@example.com",
        "success_url": "https://marketentrysecrets.com/welcome",
        "cancel_url": "https://marketentrysecrets.com/pricing"
    })
}

#[tokio::test]
async fn creates_session_in_configured_mode() {
    let app = setup_test_app(TestAppOptions::default()).await;
    Mock::given(method("POST"))
        .and(path("/v1/checkout/sessions"))
        .and(header("authorization", "Bearer sk_test_123"))
        .and(body_string_contains("price_growth"))
        .and(body_string_contains("customer_email=founder%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "cs_test_42",
            "url": "https://checkout.stripe.com/c/pay/cs_test_42"
        })))
        .expect(1)
        .mount(&app.stripe)
        .await;

    let (status, body) = app.call(post_json(CHECKOUT_URI, &request_body("growth"))).await;

    assert_eq!(status, 200, "body: {body}");
    assert_eq!(
        body,
        json!({
            "id": "cs_test_42",
            "url": "https://checkout.stripe.com/c/pay/cs_test_42",
            "mode": "test"
        })
    );
}

#[tokio::test]
async fn unknown_plan_is_bad_request() {
    let app = setup_test_app(TestAppOptions::default()).await;

    let (status, body) = app.call(post_json(CHECKOUT_URI, &request_body("enterprise"))).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().contains("enterprise"));
    assert!(app.stripe.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_body_is_bad_request_envelope() {
    let app = setup_test_app(TestAppOptions::default()).await;

    let (status, body) = app.call(post_json(CHECKOUT_URI, &json!({"plan": "growth"}))).await;

    assert_eq!(status, 400);
    assert!(body["error"].as_str().unwrap().starts_with("invalid request body"));
}

#[tokio::test]
async fn missing_secret_key_is_server_error() {
    let app = setup_test_app(TestAppOptions { stripe_key: None, ..Default::default() }).await;

    let (status, body) = app.call(post_json(CHECKOUT_URI, &request_body("growth"))).await;

    assert_eq!(status, 500);
    assert!(body["error"].is_string());
    assert!(app.stripe.received_requests().await.unwrap().is_empty());
}

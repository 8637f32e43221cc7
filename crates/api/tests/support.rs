#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use mes_app::AppContext;
use mes_domain::{AppConfig, PlanPrice, StoreBackend};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::MockServer;

/// Application context wired to a temporary SQLite store and mock Lemlist
/// and Stripe servers.
pub struct TestApp {
    pub ctx: Arc<AppContext>,
    pub lemlist: MockServer,
    pub stripe: MockServer,
    _temp_dir: TempDir,
}

pub struct TestAppOptions {
    pub lemlist_key: Option<&'static str>,
    pub stripe_key: Option<&'static str>,
}

impl Default for TestAppOptions {
    fn default() -> Self {
        Self { lemlist_key: Some("lem_test_key"), stripe_key: Some("sk_test_123") }
    }
}

pub async fn setup_test_app(options: TestAppOptions) -> TestApp {
    let temp_dir = TempDir::new().expect("failed to create temporary directory");
    let lemlist = MockServer::start().await;
    let stripe = MockServer::start().await;

    let mut config = AppConfig::default();
    config.store = StoreBackend::Sqlite;
    config.database.path = temp_dir.path().join("mes.db").display().to_string();
    config.lemlist.base_url = lemlist.uri();
    config.lemlist.api_key = options.lemlist_key.map(str::to_string);
    config.stripe.base_url = format!("{}/v1", stripe.uri());
    config.stripe.test_secret_key = options.stripe_key.map(str::to_string);
    config
        .stripe
        .test_plans
        .insert("growth".into(), PlanPrice { price_id: "price_growth".into(), recurring: true });

    let ctx = AppContext::new(config).expect("failed to build application context");

    TestApp { ctx: Arc::new(ctx), lemlist, stripe, _temp_dir: temp_dir }
}

impl TestApp {
    /// Send one request through the router and decode the JSON body.
    pub async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = mes_app::router(Arc::clone(&self.ctx))
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body readable");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::post(uri).body(Body::empty()).expect("valid request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

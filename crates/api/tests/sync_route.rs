//! `POST /functions/v1/sync-lemlist` against a SQLite store and a mock
//! Lemlist API.

mod support;

use serde_json::json;
use support::{post_empty, setup_test_app, TestAppOptions};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const SYNC_URI: &str = "/functions/v1/sync-lemlist";

#[tokio::test]
async fn sync_mirrors_and_links_records() {
    let app = setup_test_app(TestAppOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .and(query_param("offset", "0"))
        .and(header("authorization", "Bearer lem_test_key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "c1", "name": "Acme", "domain": "https://www.acme.com/about"},
            {"_id": "c2", "name": "Globex"}
        ])))
        .expect(1)
        .mount(&app.lemlist)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"_id": "p1", "email": "ada@acme.com", "companyId": "c1"},
            {"_id": "p2", "email": "bob@globex.com", "fields": {"companyName": "globex"}},
            {"_id": "p3", "email": "carol@nowhere.io"}
        ]})))
        .expect(1)
        .mount(&app.lemlist)
        .await;

    let (status, body) = app.call(post_empty(SYNC_URI)).await;

    assert_eq!(status, 200, "body: {body}");
    assert_eq!(body["success"], json!(true));
    assert_eq!(body["companies_synced"], json!(2));
    assert_eq!(body["contacts_synced"], json!(3));
    assert_eq!(body["contacts_linked"], json!(2));
    assert_eq!(body["errors"], json!([]));
    assert!(body["duration_ms"].is_u64());

    assert_eq!(app.ctx.store.count_companies().await.unwrap(), 2);
    assert_eq!(app.ctx.store.count_contacts().await.unwrap(), 3);

    let acme = app.ctx.store.get_company_by_external_id("c1").await.unwrap().unwrap();
    let ada = app.ctx.store.get_contact_by_external_id("p1").await.unwrap().unwrap();
    assert_eq!(acme.domain.as_deref(), Some("www.acme.com"));
    assert_eq!(ada.company_id, Some(acme.id));
}

#[tokio::test]
async fn missing_api_key_fails_before_any_request() {
    let app = setup_test_app(TestAppOptions { lemlist_key: None, ..Default::default() }).await;

    let (status, body) = app.call(post_empty(SYNC_URI)).await;

    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "LEMLIST_API_KEY is not configured"}));
    assert!(app.lemlist.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_sync_is_rejected() {
    let app = setup_test_app(TestAppOptions::default()).await;
    let _running = app.ctx.try_begin_sync().unwrap();

    let (status, body) = app.call(post_empty(SYNC_URI)).await;

    assert_eq!(status, 409);
    assert_eq!(body, json!({"error": "sync already in progress"}));
    assert!(app.lemlist.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_page_is_reported_not_fatal() {
    let app = setup_test_app(TestAppOptions::default()).await;
    Mock::given(method("GET"))
        .and(path("/companies"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"_id": "c1", "name": "Acme"}
        ])))
        .mount(&app.lemlist)
        .await;
    Mock::given(method("GET"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&app.lemlist)
        .await;

    let (status, body) = app.call(post_empty(SYNC_URI)).await;

    assert_eq!(status, 200);
    assert_eq!(body["companies_synced"], json!(1));
    assert_eq!(body["contacts_synced"], json!(0));
    let errors = body["errors"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].as_str().unwrap().starts_with("Failed to fetch contacts at offset 0"));
}

//! Lemlist CRM source
//!
//! Read-only client for the companies and contacts list endpoints, paged by
//! `offset` and `limit`, authenticated with a bearer API key.

use std::time::Duration;

use async_trait::async_trait;
use mes_core::{CrmSource, SourcePage};
use mes_domain::{LemlistConfig, MesError, RecordKind, Result};
use reqwest::Method;
use tracing::{debug, instrument};
use url::Url;

use super::types::ListResponse;
use crate::http::HttpClient;

pub struct LemlistClient {
    http: HttpClient,
    base_url: String,
    api_key: Option<String>,
}

impl LemlistClient {
    /// Build a client from configuration. A missing API key is accepted here
    /// and reported by [`CrmSource::ensure_credentials`].
    pub fn new(config: &LemlistConfig) -> Result<Self> {
        Url::parse(&config.base_url).map_err(|e| {
            MesError::Config(format!("invalid Lemlist base URL '{}': {e}", config.base_url))
        })?;

        let http =
            HttpClient::builder().timeout(Duration::from_secs(config.timeout_secs.max(1))).build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().filter(|k| !k.trim().is_empty()),
        })
    }

    fn endpoint(&self, kind: RecordKind) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url, kind.collection());
        Url::parse(&raw).map_err(|e| MesError::Config(format!("invalid Lemlist URL '{raw}': {e}")))
    }

    fn api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .ok_or_else(|| MesError::Config("LEMLIST_API_KEY is not configured".to_string()))
    }
}

#[async_trait]
impl CrmSource for LemlistClient {
    fn ensure_credentials(&self) -> Result<()> {
        self.api_key().map(|_| ())
    }

    #[instrument(skip(self), fields(kind = %kind))]
    async fn fetch_page(
        &self,
        kind: RecordKind,
        offset: usize,
        limit: usize,
    ) -> Result<SourcePage> {
        let api_key = self.api_key()?;
        let url = self.endpoint(kind)?;

        let request = self
            .http
            .request(Method::GET, url)
            .bearer_auth(api_key)
            .query(&[("offset", offset), ("limit", limit)]);

        let page: ListResponse = self.http.send_json(request).await?;
        let page = page.into_page();
        debug!(
            offset,
            received = page.received,
            usable = page.records.len(),
            "lemlist page received"
        );

        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn config(base_url: String, api_key: Option<&str>) -> LemlistConfig {
        LemlistConfig { api_key: api_key.map(str::to_string), base_url, timeout_secs: 5 }
    }

    #[tokio::test]
    async fn fetches_page_with_bearer_and_paging_params() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/companies"))
            .and(query_param("offset", "100"))
            .and(query_param("limit", "100"))
            .and(header("authorization", "Bearer lem_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"_id": "c1", "name": "Acme"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            LemlistClient::new(&config(format!("{}/api/", server.uri()), Some("lem_key"))).unwrap();
        let page = client.fetch_page(RecordKind::Company, 100, 100).await.unwrap();

        assert_eq!(page.received, 1);
        assert_eq!(page.records[0]["name"], json!("Acme"));
    }

    #[tokio::test]
    async fn http_error_surfaces_as_domain_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/contacts"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .expect(1)
            .mount(&server)
            .await;

        let client = LemlistClient::new(&config(server.uri(), Some("wrong"))).unwrap();
        let err = client.fetch_page(RecordKind::Contact, 0, 100).await.unwrap_err();

        assert!(matches!(err, MesError::Auth(ref msg) if msg.contains("bad key")));
    }

    #[tokio::test]
    async fn missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = LemlistClient::new(&config(server.uri(), Some("   "))).unwrap();

        assert!(matches!(client.ensure_credentials(), Err(MesError::Config(_))));
        assert!(client.fetch_page(RecordKind::Company, 0, 10).await.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn invalid_base_url_is_config_error() {
        let result = LemlistClient::new(&config("not a url".into(), Some("k")));
        assert!(matches!(result, Err(MesError::Config(_))));
    }
}

//! Supabase (PostgREST) implementation of [`CrmStore`]
//!
//! Rows are upserted with `on_conflict=external_id` and
//! `resolution=merge-duplicates`, so re-running a sync overwrites in place
//! and keeps the row id.

use async_trait::async_trait;
use mes_core::CrmStore;
use mes_domain::{
    Company, CompanyLinkKey, Contact, MesError, NewCompany, NewContact, Result, SupabaseConfig,
};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use crate::http::HttpClient;

const LINK_KEY_PAGE_SIZE: usize = 1000;

pub struct SupabaseCrmStore {
    http: HttpClient,
    rest_url: String,
    companies_table: String,
    contacts_table: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

impl SupabaseCrmStore {
    /// Build a store from configuration. Both the project URL and the
    /// service role key are required.
    pub fn new(config: &SupabaseConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| MesError::Config("SUPABASE_URL is not configured".to_string()))?;
        let service_key = config
            .service_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                MesError::Config("SUPABASE_SERVICE_ROLE_KEY is not configured".to_string())
            })?;

        Url::parse(url)
            .map_err(|e| MesError::Config(format!("invalid Supabase URL '{url}': {e}")))?;

        let http = HttpClient::builder().default_headers(auth_headers(service_key)?).build()?;

        Ok(Self {
            http,
            rest_url: format!("{}/rest/v1", url.trim_end_matches('/')),
            companies_table: config.companies_table.clone(),
            contacts_table: config.contacts_table.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{table}", self.rest_url)
    }

    async fn upsert_row<T: Serialize + Sync>(&self, table: &str, row: &T) -> Result<String> {
        let request = self
            .http
            .request(Method::POST, self.table_url(table))
            .query(&[("on_conflict", "external_id")])
            .header("Prefer", "resolution=merge-duplicates,return=representation")
            .json(&[row]);

        let rows: Vec<IdRow> = self.http.send_json(request).await?;
        rows.into_iter().next().map(|row| row.id).ok_or_else(|| {
            MesError::Database(format!("upsert into {table} returned no representation"))
        })
    }

    async fn get_by_external_id<T: DeserializeOwned>(
        &self,
        table: &str,
        external_id: &str,
    ) -> Result<Option<T>> {
        let filter = format!("eq.{external_id}");
        let request = self
            .http
            .request(Method::GET, self.table_url(table))
            .query(&[("select", "*"), ("external_id", filter.as_str()), ("limit", "1")]);

        let rows: Vec<T> = self.http.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    async fn count_rows(&self, table: &str) -> Result<usize> {
        let request = self
            .http
            .request(Method::GET, self.table_url(table))
            .query(&[("select", "id")])
            .header("Prefer", "count=exact")
            .header("Range-Unit", "items")
            .header("Range", "0-0");

        let response = self.http.send_checked(request).await?;
        let header = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        parse_content_range_total(header).ok_or_else(|| {
            MesError::Database(format!("unexpected Content-Range '{header}' counting {table}"))
        })
    }

    fn page_request(&self, offset: usize) -> RequestBuilder {
        self.http.request(Method::GET, self.table_url(&self.companies_table)).query(&[
            ("select", "id,name,domain".to_string()),
            ("order", "id.asc".to_string()),
            ("offset", offset.to_string()),
            ("limit", LINK_KEY_PAGE_SIZE.to_string()),
        ])
    }
}

#[async_trait]
impl CrmStore for SupabaseCrmStore {
    #[instrument(skip_all, fields(external_id = %company.external_id))]
    async fn upsert_company(&self, company: &NewCompany) -> Result<String> {
        self.upsert_row(&self.companies_table, company).await
    }

    #[instrument(skip_all, fields(external_id = %contact.external_id))]
    async fn upsert_contact(&self, contact: &NewContact) -> Result<String> {
        self.upsert_row(&self.contacts_table, contact).await
    }

    async fn list_company_link_keys(&self) -> Result<Vec<CompanyLinkKey>> {
        let mut keys = Vec::new();
        let mut offset = 0;
        loop {
            let page: Vec<CompanyLinkKey> = self.http.send_json(self.page_request(offset)).await?;
            let fetched = page.len();
            keys.extend(page);
            if fetched < LINK_KEY_PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        debug!(companies = keys.len(), "loaded company link keys");
        Ok(keys)
    }

    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Option<Company>> {
        self.get_by_external_id(&self.companies_table, external_id).await
    }

    async fn get_contact_by_external_id(&self, external_id: &str) -> Result<Option<Contact>> {
        self.get_by_external_id(&self.contacts_table, external_id).await
    }

    async fn count_companies(&self) -> Result<usize> {
        self.count_rows(&self.companies_table).await
    }

    async fn count_contacts(&self) -> Result<usize> {
        self.count_rows(&self.contacts_table).await
    }
}

fn auth_headers(service_key: &str) -> Result<HeaderMap> {
    let invalid = |_| MesError::Config("Supabase service key is not a valid header".to_string());

    let mut headers = HeaderMap::new();
    let mut api_key = HeaderValue::from_str(service_key).map_err(invalid)?;
    api_key.set_sensitive(true);
    let mut bearer = HeaderValue::from_str(&format!("Bearer {service_key}")).map_err(invalid)?;
    bearer.set_sensitive(true);

    headers.insert("apikey", api_key);
    headers.insert(AUTHORIZATION, bearer);
    Ok(headers)
}

/// Total from a PostgREST `Content-Range` header such as `0-0/42` or `*/0`.
fn parse_content_range_total(header: &str) -> Option<usize> {
    header.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

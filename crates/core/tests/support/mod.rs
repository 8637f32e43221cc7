//! Shared test helpers for `mes-core` integration tests.
//!
//! In-memory mocks for the sync and billing ports: a CRM source that serves
//! scripted pages and counts calls, a store with injectable per-record
//! failures, and a recording checkout gateway.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use mes_core::{
    CheckoutGateway, CheckoutSessionParams, CreatedSession, CrmSource, CrmStore, SourcePage,
};
use mes_domain::{
    Company, CompanyLinkKey, Contact, MesError, NewCompany, NewContact, RawRecord, RecordKind,
    Result,
};
use serde_json::Value;

/// Convert a `json!` object literal into a raw source record.
pub fn record(value: Value) -> RawRecord {
    match value {
        Value::Object(map) => map,
        other => panic!("expected JSON object, got {other:?}"),
    }
}

/// CRM source serving fixed collections through offset/limit pages.
pub struct MockSource {
    companies: Vec<RawRecord>,
    contacts: Vec<RawRecord>,
    has_credentials: bool,
    failing_page: Option<(RecordKind, usize)>,
    calls: AtomicUsize,
}

impl MockSource {
    pub fn new(companies: Vec<Value>, contacts: Vec<Value>) -> Self {
        Self {
            companies: companies.into_iter().map(record).collect(),
            contacts: contacts.into_iter().map(record).collect(),
            has_credentials: true,
            failing_page: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn without_credentials(mut self) -> Self {
        self.has_credentials = false;
        self
    }

    /// Fail the page of `kind` starting at `offset`.
    pub fn failing_at(mut self, kind: RecordKind, offset: usize) -> Self {
        self.failing_page = Some((kind, offset));
        self
    }

    pub fn fetch_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmSource for MockSource {
    fn ensure_credentials(&self) -> Result<()> {
        if self.has_credentials {
            Ok(())
        } else {
            Err(MesError::Config("LEMLIST_API_KEY is not configured".into()))
        }
    }

    async fn fetch_page(
        &self,
        kind: RecordKind,
        offset: usize,
        limit: usize,
    ) -> Result<SourcePage> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_page == Some((kind, offset)) {
            return Err(MesError::Network("HTTP 500 Internal Server Error".into()));
        }

        let records = match kind {
            RecordKind::Company => &self.companies,
            RecordKind::Contact => &self.contacts,
        };
        Ok(SourcePage::new(records.iter().skip(offset).take(limit).cloned().collect()))
    }
}

#[derive(Default)]
struct StoreState {
    companies: Vec<Company>,
    contacts: Vec<Contact>,
    next_id: usize,
}

impl StoreState {
    fn allocate_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }
}

/// In-memory store keyed by `external_id`.
#[derive(Default)]
pub struct MockStore {
    state: Mutex<StoreState>,
    rejected: Mutex<HashSet<String>>,
    fail_link_keys: bool,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject upserts of this external id as a constraint violation would.
    pub fn rejecting(self, external_id: &str) -> Self {
        self.rejected.lock().unwrap().insert(external_id.to_string());
        self
    }

    pub fn failing_link_keys(mut self) -> Self {
        self.fail_link_keys = true;
        self
    }

    /// Seed a company as if a previous run had stored it.
    pub fn with_company(self, external_id: &str, name: &str, domain: Option<&str>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let id = state.allocate_id("company");
            state.companies.push(Company::from_new(
                id,
                NewCompany {
                    external_id: external_id.to_string(),
                    name: name.to_string(),
                    domain: domain.map(str::to_string),
                    industry: None,
                    size: None,
                    location: None,
                    linkedin_url: None,
                    raw_fields: Default::default(),
                    owner_id: None,
                    source_created_at: None,
                },
                Utc::now(),
            ));
        }
        self
    }

    pub fn companies(&self) -> Vec<Company> {
        self.state.lock().unwrap().companies.clone()
    }

    pub fn contacts(&self) -> Vec<Contact> {
        self.state.lock().unwrap().contacts.clone()
    }

    pub fn company_id_for(&self, external_id: &str) -> Option<String> {
        self.companies().into_iter().find(|c| c.external_id == external_id).map(|c| c.id)
    }

    pub fn contact(&self, external_id: &str) -> Option<Contact> {
        self.contacts().into_iter().find(|c| c.external_id == external_id)
    }

    fn check_rejected(&self, external_id: &str) -> Result<()> {
        if self.rejected.lock().unwrap().contains(external_id) {
            return Err(MesError::Database(format!(
                "CHECK constraint failed for external_id {external_id}"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CrmStore for MockStore {
    async fn upsert_company(&self, company: &NewCompany) -> Result<String> {
        self.check_rejected(&company.external_id)?;
        let mut state = self.state.lock().unwrap();

        if let Some(existing) =
            state.companies.iter_mut().find(|c| c.external_id == company.external_id)
        {
            *existing = Company::from_new(existing.id.clone(), company.clone(), Utc::now());
            return Ok(existing.id.clone());
        }

        let id = state.allocate_id("company");
        state.companies.push(Company::from_new(id.clone(), company.clone(), Utc::now()));
        Ok(id)
    }

    async fn upsert_contact(&self, contact: &NewContact) -> Result<String> {
        self.check_rejected(&contact.external_id)?;
        let mut state = self.state.lock().unwrap();

        if let Some(existing) =
            state.contacts.iter_mut().find(|c| c.external_id == contact.external_id)
        {
            *existing = Contact::from_new(existing.id.clone(), contact.clone(), Utc::now());
            return Ok(existing.id.clone());
        }

        let id = state.allocate_id("contact");
        state.contacts.push(Contact::from_new(id.clone(), contact.clone(), Utc::now()));
        Ok(id)
    }

    async fn list_company_link_keys(&self) -> Result<Vec<CompanyLinkKey>> {
        if self.fail_link_keys {
            return Err(MesError::Database("connection reset".into()));
        }
        Ok(self.state.lock().unwrap().companies.iter().map(Company::link_key).collect())
    }

    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Option<Company>> {
        Ok(self.companies().into_iter().find(|c| c.external_id == external_id))
    }

    async fn get_contact_by_external_id(&self, external_id: &str) -> Result<Option<Contact>> {
        Ok(self.contact(external_id))
    }

    async fn count_companies(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().companies.len())
    }

    async fn count_contacts(&self) -> Result<usize> {
        Ok(self.state.lock().unwrap().contacts.len())
    }
}

/// Gateway that records every request and returns a fixed session.
#[derive(Default)]
pub struct RecordingGateway {
    requests: Mutex<Vec<(String, CheckoutSessionParams)>>,
    failure: Option<MesError>,
}

impl RecordingGateway {
    pub fn failing(error: MesError) -> Self {
        Self { requests: Mutex::default(), failure: Some(error) }
    }

    pub fn requests(&self) -> Vec<(String, CheckoutSessionParams)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl CheckoutGateway for RecordingGateway {
    async fn create_session(
        &self,
        secret_key: &str,
        params: &CheckoutSessionParams,
    ) -> Result<CreatedSession> {
        self.requests.lock().unwrap().push((secret_key.to_string(), params.clone()));
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        Ok(CreatedSession {
            id: "cs_test_123".into(),
            url: Some("https://checkout.stripe.com/c/pay/cs_test_123".into()),
        })
    }
}

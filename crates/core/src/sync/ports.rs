//! Port interfaces for the contact sync job

use async_trait::async_trait;
use mes_domain::{
    Company, CompanyLinkKey, Contact, NewCompany, NewContact, RawRecord, RecordKind, Result,
};

/// One page of a list endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourcePage {
    /// Entries usable as records.
    pub records: Vec<RawRecord>,
    /// Entries the source returned, usable or not. Pagination ends on this.
    pub received: usize,
}

impl SourcePage {
    /// A page where every entry was usable.
    pub fn new(records: Vec<RawRecord>) -> Self {
        let received = records.len();
        Self { records, received }
    }

    /// Entries returned by the source that could not be used as records.
    pub fn skipped(&self) -> usize {
        self.received.saturating_sub(self.records.len())
    }
}

/// Read-only access to the external CRM's list endpoints.
#[async_trait]
pub trait CrmSource: Send + Sync {
    /// Fatal precondition check, performed before any network activity.
    fn ensure_credentials(&self) -> Result<()>;

    /// Fetch one offset/limit page of raw records.
    async fn fetch_page(
        &self,
        kind: RecordKind,
        offset: usize,
        limit: usize,
    ) -> Result<SourcePage>;
}

/// Local mirror of CRM companies and contacts, keyed by `external_id`.
///
/// Every upsert commits independently; there is no cross-record transaction.
#[async_trait]
pub trait CrmStore: Send + Sync {
    /// Insert or update a company, returning its local id.
    async fn upsert_company(&self, company: &NewCompany) -> Result<String>;

    /// Insert or update a contact, returning its local id.
    async fn upsert_contact(&self, contact: &NewContact) -> Result<String>;

    /// Every stored company's id, name and domain.
    async fn list_company_link_keys(&self) -> Result<Vec<CompanyLinkKey>>;

    /// Look up a company by the source system's identifier.
    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Option<Company>>;

    /// Look up a contact by the source system's identifier.
    async fn get_contact_by_external_id(&self, external_id: &str) -> Result<Option<Contact>>;

    /// Number of stored companies.
    async fn count_companies(&self) -> Result<usize>;

    /// Number of stored contacts.
    async fn count_contacts(&self) -> Result<usize>;
}

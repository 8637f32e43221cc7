//! Contact sync job orchestration

use std::sync::Arc;
use std::time::Instant;

use mes_domain::constants::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE};
use mes_domain::{RecordKind, Result, SyncConfig, SyncReport};
use tracing::{debug, info, instrument, warn};

use super::linking::CompanyIndex;
use super::pagination::fetch_all;
use super::ports::{CrmSource, CrmStore};
use super::transform::{company_from_raw, contact_from_raw, record_label};

/// Pagination bounds for one sync run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncOptions {
    pub page_size: usize,
    pub max_pages: usize,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self { page_size: DEFAULT_PAGE_SIZE, max_pages: DEFAULT_MAX_PAGES }
    }
}

impl From<&SyncConfig> for SyncOptions {
    fn from(config: &SyncConfig) -> Self {
        Self { page_size: config.page_size, max_pages: config.max_pages }
    }
}

/// Mirrors CRM companies and contacts into the local store.
pub struct ContactSyncService {
    source: Arc<dyn CrmSource>,
    store: Arc<dyn CrmStore>,
    options: SyncOptions,
}

impl ContactSyncService {
    pub fn new(source: Arc<dyn CrmSource>, store: Arc<dyn CrmStore>) -> Self {
        Self::with_options(source, store, SyncOptions::default())
    }

    pub fn with_options(
        source: Arc<dyn CrmSource>,
        store: Arc<dyn CrmStore>,
        options: SyncOptions,
    ) -> Self {
        Self { source, store, options }
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Run one full refresh.
    ///
    /// 1. Check source credentials (fatal, before any network call)
    /// 2. Fetch and upsert companies, remembering source id → local id
    /// 3. Reload every stored company's domain and name for linking
    /// 4. Fetch contacts, link each one, upsert
    ///
    /// Per-record and per-page failures are collected in the report. Only the
    /// credential check and the index reload propagate as errors.
    #[instrument(skip(self))]
    pub async fn run_sync(&self) -> Result<SyncReport> {
        self.source.ensure_credentials()?;

        let started = Instant::now();
        let mut report = SyncReport::default();
        let mut index = CompanyIndex::new();

        info!(page_size = self.options.page_size, "starting contact sync");

        self.sync_companies(&mut report, &mut index).await;

        let link_keys = self.store.list_company_link_keys().await?;
        debug!(companies = link_keys.len(), "loaded company link keys");
        index.extend_link_keys(&link_keys);

        self.sync_contacts(&mut report, &index).await;

        report.duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        info!(
            companies_synced = report.companies_synced,
            contacts_synced = report.contacts_synced,
            contacts_linked = report.contacts_linked,
            errors = report.errors.len(),
            duration_ms = report.duration_ms,
            "contact sync completed"
        );

        Ok(report)
    }

    async fn sync_companies(&self, report: &mut SyncReport, index: &mut CompanyIndex) {
        let fetched = fetch_all(
            self.source.as_ref(),
            RecordKind::Company,
            self.options.page_size,
            self.options.max_pages,
        )
        .await;
        info!(records = fetched.records.len(), pages = fetched.pages, "fetched companies");
        report.errors.extend(fetched.errors);

        for raw in &fetched.records {
            let company = match company_from_raw(raw) {
                Ok(company) => company,
                Err(e) => {
                    let label = record_label(raw);
                    warn!(company = %label, error = %e, "skipping company");
                    report.errors.push(format!("Company {label}: {e}"));
                    continue;
                }
            };

            match self.store.upsert_company(&company).await {
                Ok(local_id) => {
                    index.insert_external_id(&company.external_id, &local_id);
                    report.companies_synced += 1;
                }
                Err(e) => {
                    warn!(company = %company.name, error = %e, "company upsert failed");
                    report.errors.push(format!("Company {}: {e}", company.name));
                }
            }
        }
    }

    async fn sync_contacts(&self, report: &mut SyncReport, index: &CompanyIndex) {
        let fetched = fetch_all(
            self.source.as_ref(),
            RecordKind::Contact,
            self.options.page_size,
            self.options.max_pages,
        )
        .await;
        info!(records = fetched.records.len(), pages = fetched.pages, "fetched contacts");
        report.errors.extend(fetched.errors);

        for raw in &fetched.records {
            let mut record = match contact_from_raw(raw) {
                Ok(record) => record,
                Err(e) => {
                    let label = record_label(raw);
                    warn!(contact = %label, error = %e, "skipping contact");
                    report.errors.push(format!("Contact {label}: {e}"));
                    continue;
                }
            };

            if let Some((company_id, strategy)) = index.resolve(&record.hints) {
                debug!(
                    contact = %record.contact.external_id,
                    strategy = strategy.as_str(),
                    "linked contact to company"
                );
                record.contact.company_id = Some(company_id);
            }

            match self.store.upsert_contact(&record.contact).await {
                Ok(_) => {
                    report.contacts_synced += 1;
                    if record.contact.company_id.is_some() {
                        report.contacts_linked += 1;
                    }
                }
                Err(e) => {
                    let label = record.contact.label();
                    warn!(contact = %label, error = %e, "contact upsert failed");
                    report.errors.push(format!("Contact {label}: {e}"));
                }
            }
        }
    }
}

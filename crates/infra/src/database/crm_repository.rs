//! SQLite implementation of the CRM mirror store

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mes_core::CrmStore;
use mes_domain::{
    Company, CompanyLinkKey, Contact, MesError, NewCompany, NewContact, RawFields, Result,
};
use rusqlite::{named_params, OptionalExtension, Row};
use tracing::instrument;
use uuid::Uuid;

use super::manager::DbManager;
use crate::errors::to_domain;

const COMPANY_COLUMNS: &str = "id, external_id, name, domain, industry, size, location, \
     linkedin_url, raw_fields, owner_id, source_created_at, updated_at";

const CONTACT_COLUMNS: &str = "id, external_id, full_name, first_name, last_name, email, \
     job_title, phone, linkedin_url, industry, lifecycle_status, campaign_refs, raw_fields, \
     company_id, owner_id, source_created_at, updated_at";

/// CRM store over the local SQLite database.
pub struct SqliteCrmStore {
    db: Arc<DbManager>,
}

impl SqliteCrmStore {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&DbManager) -> Result<T> + Send + 'static,
    {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || op(db.as_ref()))
            .await
            .map_err(|e| MesError::Internal(format!("blocking task failed: {e}")))?
    }
}

#[async_trait]
impl CrmStore for SqliteCrmStore {
    #[instrument(skip(self, company), fields(external_id = %company.external_id))]
    async fn upsert_company(&self, company: &NewCompany) -> Result<String> {
        let company = company.clone();
        self.blocking(move |db| {
            let conn = db.get_connection()?;
            let raw_fields = serde_json::to_string(&company.raw_fields).map_err(to_domain)?;
            let now = Utc::now().timestamp_millis();

            let id = conn.query_row(
                "INSERT INTO lemlist_companies (
                    id, external_id, name, domain, industry, size, location, linkedin_url,
                    raw_fields, owner_id, source_created_at, created_at, updated_at
                ) VALUES (
                    :id, :external_id, :name, :domain, :industry, :size, :location, :linkedin_url,
                    :raw_fields, :owner_id, :source_created_at, :now, :now
                )
                ON CONFLICT(external_id) DO UPDATE SET
                    name = excluded.name,
                    domain = excluded.domain,
                    industry = excluded.industry,
                    size = excluded.size,
                    location = excluded.location,
                    linkedin_url = excluded.linkedin_url,
                    raw_fields = excluded.raw_fields,
                    owner_id = excluded.owner_id,
                    source_created_at = excluded.source_created_at,
                    updated_at = excluded.updated_at
                RETURNING id",
                named_params! {
                    ":id": Uuid::now_v7().to_string(),
                    ":external_id": company.external_id,
                    ":name": company.name,
                    ":domain": company.domain,
                    ":industry": company.industry,
                    ":size": company.size,
                    ":location": company.location,
                    ":linkedin_url": company.linkedin_url,
                    ":raw_fields": raw_fields,
                    ":owner_id": company.owner_id,
                    ":source_created_at": company.source_created_at.map(|dt| dt.timestamp_millis()),
                    ":now": now,
                },
                |row| row.get::<_, String>(0),
            )
            .map_err(to_domain)?;
            Ok(id)
        })
        .await
    }

    #[instrument(skip(self, contact), fields(external_id = %contact.external_id))]
    async fn upsert_contact(&self, contact: &NewContact) -> Result<String> {
        let contact = contact.clone();
        self.blocking(move |db| {
            let conn = db.get_connection()?;
            let raw_fields = serde_json::to_string(&contact.raw_fields).map_err(to_domain)?;
            let campaign_refs = serde_json::to_string(&contact.campaign_refs).map_err(to_domain)?;
            let now = Utc::now().timestamp_millis();

            let id = conn.query_row(
                "INSERT INTO lemlist_contacts (
                    id, external_id, full_name, first_name, last_name, email, job_title, phone,
                    linkedin_url, industry, lifecycle_status, campaign_refs, raw_fields,
                    company_id, owner_id, source_created_at, created_at, updated_at
                ) VALUES (
                    :id, :external_id, :full_name, :first_name, :last_name, :email, :job_title,
                    :phone, :linkedin_url, :industry, :lifecycle_status, :campaign_refs,
                    :raw_fields, :company_id, :owner_id, :source_created_at, :now, :now
                )
                ON CONFLICT(external_id) DO UPDATE SET
                    full_name = excluded.full_name,
                    first_name = excluded.first_name,
                    last_name = excluded.last_name,
                    email = excluded.email,
                    job_title = excluded.job_title,
                    phone = excluded.phone,
                    linkedin_url = excluded.linkedin_url,
                    industry = excluded.industry,
                    lifecycle_status = excluded.lifecycle_status,
                    campaign_refs = excluded.campaign_refs,
                    raw_fields = excluded.raw_fields,
                    company_id = excluded.company_id,
                    owner_id = excluded.owner_id,
                    source_created_at = excluded.source_created_at,
                    updated_at = excluded.updated_at
                RETURNING id",
                named_params! {
                    ":id": Uuid::now_v7().to_string(),
                    ":external_id": contact.external_id,
                    ":full_name": contact.full_name,
                    ":first_name": contact.first_name,
                    ":last_name": contact.last_name,
                    ":email": contact.email,
                    ":job_title": contact.job_title,
                    ":phone": contact.phone,
                    ":linkedin_url": contact.linkedin_url,
                    ":industry": contact.industry,
                    ":lifecycle_status": contact.lifecycle_status,
                    ":campaign_refs": campaign_refs,
                    ":raw_fields": raw_fields,
                    ":company_id": contact.company_id,
                    ":owner_id": contact.owner_id,
                    ":source_created_at": contact.source_created_at.map(|dt| dt.timestamp_millis()),
                    ":now": now,
                },
                |row| row.get::<_, String>(0),
            )
            .map_err(to_domain)?;
            Ok(id)
        })
        .await
    }

    async fn list_company_link_keys(&self) -> Result<Vec<CompanyLinkKey>> {
        self.blocking(|db| {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare("SELECT id, name, domain FROM lemlist_companies ORDER BY rowid")
                .map_err(to_domain)?;

            let keys = stmt
                .query_map([], |row| {
                    Ok(CompanyLinkKey { id: row.get(0)?, name: row.get(1)?, domain: row.get(2)? })
                })
                .map_err(to_domain)?
                .collect::<rusqlite::Result<Vec<_>>>()
                .map_err(to_domain)?;
            Ok(keys)
        })
        .await
    }

    async fn get_company_by_external_id(&self, external_id: &str) -> Result<Option<Company>> {
        let external_id = external_id.to_string();
        self.blocking(move |db| {
            let conn = db.get_connection()?;
            let found = conn.query_row(
                &format!("SELECT {COMPANY_COLUMNS} FROM lemlist_companies WHERE external_id = ?1"),
                [&external_id],
                map_company_row,
            )
            .optional()
            .map_err(to_domain)?;
            Ok(found)
        })
        .await
    }

    async fn get_contact_by_external_id(&self, external_id: &str) -> Result<Option<Contact>> {
        let external_id = external_id.to_string();
        self.blocking(move |db| {
            let conn = db.get_connection()?;
            let found = conn.query_row(
                &format!("SELECT {CONTACT_COLUMNS} FROM lemlist_contacts WHERE external_id = ?1"),
                [&external_id],
                map_contact_row,
            )
            .optional()
            .map_err(to_domain)?;
            Ok(found)
        })
        .await
    }

    async fn count_companies(&self) -> Result<usize> {
        self.blocking(|db| count_rows(db, "lemlist_companies")).await
    }

    async fn count_contacts(&self) -> Result<usize> {
        self.blocking(|db| count_rows(db, "lemlist_contacts")).await
    }
}

fn count_rows(db: &DbManager, table: &'static str) -> Result<usize> {
    let conn = db.get_connection()?;
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .map_err(to_domain)?;
    usize::try_from(count).map_err(|e| MesError::Internal(format!("invalid row count: {e}")))
}

fn map_company_row(row: &Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        external_id: row.get(1)?,
        name: row.get(2)?,
        domain: row.get(3)?,
        industry: row.get(4)?,
        size: row.get(5)?,
        location: row.get(6)?,
        linkedin_url: row.get(7)?,
        raw_fields: json_column::<RawFields>(row, 8)?,
        owner_id: row.get(9)?,
        source_created_at: row.get::<_, Option<i64>>(10)?.and_then(DateTime::from_timestamp_millis),
        updated_at: millis_column(row, 11)?,
    })
}

fn map_contact_row(row: &Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        external_id: row.get(1)?,
        full_name: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        email: row.get(5)?,
        job_title: row.get(6)?,
        phone: row.get(7)?,
        linkedin_url: row.get(8)?,
        industry: row.get(9)?,
        lifecycle_status: row.get(10)?,
        campaign_refs: json_column::<Vec<String>>(row, 11)?,
        raw_fields: json_column::<RawFields>(row, 12)?,
        company_id: row.get(13)?,
        owner_id: row.get(14)?,
        source_created_at: row.get::<_, Option<i64>>(15)?.and_then(DateTime::from_timestamp_millis),
        updated_at: millis_column(row, 16)?,
    })
}

fn json_column<T: serde::de::DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn millis_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let millis: i64 = row.get(idx)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(idx, millis))
}

//! CRM mirror records
//!
//! Companies and contacts pulled from the external CRM and mirrored into the
//! local store, keyed by the source system's immutable identifier.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Loosely-typed record as returned by the source API.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Source fields that were not promoted to first-class columns.
pub type RawFields = serde_json::Map<String, serde_json::Value>;

/// Which source collection a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Company,
    Contact,
}

crate::impl_domain_enum_conversions!(RecordKind {
    Company => "company",
    Contact => "contact",
});

impl RecordKind {
    /// Plural collection name used by list endpoints and log fields.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Company => "companies",
            Self::Contact => "contacts",
        }
    }
}

/// Canonical company shape ready to be upserted by `external_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCompany {
    pub external_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub raw_fields: RawFields,
    pub owner_id: Option<String>,
    pub source_created_at: Option<DateTime<Utc>>,
}

/// Company row as persisted in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub external_id: String,
    pub name: String,
    pub domain: Option<String>,
    pub industry: Option<String>,
    pub size: Option<String>,
    pub location: Option<String>,
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub raw_fields: RawFields,
    pub owner_id: Option<String>,
    pub source_created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Company {
    /// Persisted view of an upsert payload.
    pub fn from_new(id: String, new: NewCompany, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: new.external_id,
            name: new.name,
            domain: new.domain,
            industry: new.industry,
            size: new.size,
            location: new.location,
            linkedin_url: new.linkedin_url,
            raw_fields: new.raw_fields,
            owner_id: new.owner_id,
            source_created_at: new.source_created_at,
            updated_at,
        }
    }

    pub fn link_key(&self) -> CompanyLinkKey {
        CompanyLinkKey { id: self.id.clone(), name: self.name.clone(), domain: self.domain.clone() }
    }
}

/// Canonical contact shape ready to be upserted by `external_id`.
///
/// `company_id` is the local id of the linked company, resolved at sync time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewContact {
    pub external_id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub lifecycle_status: Option<String>,
    #[serde(default)]
    pub campaign_refs: Vec<String>,
    #[serde(default)]
    pub raw_fields: RawFields,
    pub company_id: Option<String>,
    pub owner_id: Option<String>,
    pub source_created_at: Option<DateTime<Utc>>,
}

impl NewContact {
    /// Human-readable label for log lines and error messages.
    pub fn label(&self) -> &str {
        self.email
            .as_deref()
            .or(self.full_name.as_deref())
            .unwrap_or(self.external_id.as_str())
    }
}

/// Contact row as persisted in the local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub external_id: String,
    pub full_name: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub job_title: Option<String>,
    pub phone: Option<String>,
    pub linkedin_url: Option<String>,
    pub industry: Option<String>,
    pub lifecycle_status: Option<String>,
    #[serde(default)]
    pub campaign_refs: Vec<String>,
    #[serde(default)]
    pub raw_fields: RawFields,
    pub company_id: Option<String>,
    pub owner_id: Option<String>,
    pub source_created_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Persisted view of an upsert payload.
    pub fn from_new(id: String, new: NewContact, updated_at: DateTime<Utc>) -> Self {
        Self {
            id,
            external_id: new.external_id,
            full_name: new.full_name,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            job_title: new.job_title,
            phone: new.phone,
            linkedin_url: new.linkedin_url,
            industry: new.industry,
            lifecycle_status: new.lifecycle_status,
            campaign_refs: new.campaign_refs,
            raw_fields: new.raw_fields,
            company_id: new.company_id,
            owner_id: new.owner_id,
            source_created_at: new.source_created_at,
            updated_at,
        }
    }
}

/// Minimal company projection used to build the linking indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLinkKey {
    pub id: String,
    pub name: String,
    pub domain: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact(external_id: &str) -> NewContact {
        NewContact {
            external_id: external_id.to_string(),
            full_name: None,
            first_name: None,
            last_name: None,
            email: None,
            job_title: None,
            phone: None,
            linkedin_url: None,
            industry: None,
            lifecycle_status: None,
            campaign_refs: Vec::new(),
            raw_fields: RawFields::new(),
            company_id: None,
            owner_id: None,
            source_created_at: None,
        }
    }

    #[test]
    fn contact_label_prefers_email_then_name() {
        let mut c = contact("p1");
        assert_eq!(c.label(), "p1");

        c.full_name = Some("Ada Lovelace".into());
        assert_eq!(c.label(), "Ada Lovelace");

        c.email = Some("ada@example.com".into());
        assert_eq!(c.label(), "ada@example.com");
    }

    #[test]
    fn record_kind_collections() {
        assert_eq!(RecordKind::Company.collection(), "companies");
        assert_eq!(RecordKind::Contact.collection(), "contacts");
        assert_eq!(RecordKind::Contact.to_string(), "contact");
    }
}

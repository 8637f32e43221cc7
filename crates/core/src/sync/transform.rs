//! Normalisation of loosely-typed source records
//!
//! Business fields may sit at the top level of a record or inside a generic
//! `fields` bag. Lookups walk a fallback chain of keys and, for each key, try
//! the top level before the bag. Anything not promoted to a column is kept in
//! `raw_fields`.

use std::collections::HashSet;

use chrono::{DateTime, TimeZone, Utc};
use mes_domain::constants::UNKNOWN_COMPANY_NAME;
use mes_domain::{MesError, NewCompany, NewContact, RawFields, RawRecord, Result};
use serde_json::Value;

use super::linking::CompanyHints;

const FIELDS_BAG: &str = "fields";
const ID_KEYS: &[&str] = &["_id", "id"];
const OWNER_KEYS: &[&str] = &["ownerId", "owner"];
const CREATED_AT_KEYS: &[&str] = &["createdAt", "created_at"];
const LINKEDIN_KEYS: &[&str] = &["linkedinUrl", "linkedInUrl", "linkedin"];

const COMPANY_NAME_KEYS: &[&str] = &["name", "companyName"];
const COMPANY_DOMAIN_KEYS: &[&str] = &["domain", "website"];
const COMPANY_INDUSTRY_KEYS: &[&str] = &["industry", "companyIndustry"];
const COMPANY_SIZE_KEYS: &[&str] = &["size", "companySize", "employeeCount", "employees"];
const COMPANY_LOCATION_KEYS: &[&str] = &["location", "companyLocation", "country", "city"];

const CONTACT_FULL_NAME_KEYS: &[&str] = &["fullName", "name"];
const CONTACT_FIRST_NAME_KEYS: &[&str] = &["firstName"];
const CONTACT_LAST_NAME_KEYS: &[&str] = &["lastName"];
const CONTACT_EMAIL_KEYS: &[&str] = &["email"];
const CONTACT_JOB_TITLE_KEYS: &[&str] = &["jobTitle", "position", "title"];
const CONTACT_PHONE_KEYS: &[&str] = &["phone", "phoneNumber"];
const CONTACT_INDUSTRY_KEYS: &[&str] = &["industry"];
const CONTACT_LIFECYCLE_KEYS: &[&str] = &["lifecycleStatus", "status"];
const CONTACT_CAMPAIGN_KEYS: &[&str] = &["campaignIds", "campaigns", "campaignId"];
const CONTACT_COMPANY_ID_KEYS: &[&str] = &["companyId"];
const CONTACT_COMPANY_DOMAIN_KEYS: &[&str] = &["companyDomain"];
const CONTACT_COMPANY_NAME_KEYS: &[&str] = &["companyName"];

const COMPANY_PROMOTED: &[&[&str]] = &[
    ID_KEYS,
    OWNER_KEYS,
    CREATED_AT_KEYS,
    LINKEDIN_KEYS,
    COMPANY_NAME_KEYS,
    COMPANY_DOMAIN_KEYS,
    COMPANY_INDUSTRY_KEYS,
    COMPANY_SIZE_KEYS,
    COMPANY_LOCATION_KEYS,
];

const CONTACT_PROMOTED: &[&[&str]] = &[
    ID_KEYS,
    OWNER_KEYS,
    CREATED_AT_KEYS,
    LINKEDIN_KEYS,
    CONTACT_FULL_NAME_KEYS,
    CONTACT_FIRST_NAME_KEYS,
    CONTACT_LAST_NAME_KEYS,
    CONTACT_EMAIL_KEYS,
    CONTACT_JOB_TITLE_KEYS,
    CONTACT_PHONE_KEYS,
    CONTACT_INDUSTRY_KEYS,
    CONTACT_LIFECYCLE_KEYS,
    CONTACT_CAMPAIGN_KEYS,
    CONTACT_COMPANY_ID_KEYS,
    CONTACT_COMPANY_DOMAIN_KEYS,
    CONTACT_COMPANY_NAME_KEYS,
];

/// A normalised contact plus the raw hints used to link it to a company.
#[derive(Debug, Clone, PartialEq)]
pub struct ContactRecord {
    pub contact: NewContact,
    pub hints: CompanyHints,
}

/// Map a raw company into the canonical upsert shape.
///
/// # Errors
/// Returns `MesError::InvalidInput` when the record carries no identifier.
pub fn company_from_raw(raw: &RawRecord) -> Result<NewCompany> {
    let external_id = external_id(raw)?;
    let name = text(raw, COMPANY_NAME_KEYS).unwrap_or_else(|| UNKNOWN_COMPANY_NAME.to_string());

    Ok(NewCompany {
        external_id,
        name,
        domain: text(raw, COMPANY_DOMAIN_KEYS).and_then(|d| clean_domain(&d)),
        industry: text(raw, COMPANY_INDUSTRY_KEYS),
        size: text(raw, COMPANY_SIZE_KEYS),
        location: text(raw, COMPANY_LOCATION_KEYS),
        linkedin_url: text(raw, LINKEDIN_KEYS),
        raw_fields: raw_fields(raw, COMPANY_PROMOTED),
        owner_id: owner_id(raw),
        source_created_at: timestamp(raw, CREATED_AT_KEYS),
    })
}

/// Map a raw contact into the canonical upsert shape, unlinked.
///
/// # Errors
/// Returns `MesError::InvalidInput` when the record carries no identifier.
pub fn contact_from_raw(raw: &RawRecord) -> Result<ContactRecord> {
    let external_id = external_id(raw)?;
    let first_name = text(raw, CONTACT_FIRST_NAME_KEYS);
    let last_name = text(raw, CONTACT_LAST_NAME_KEYS);
    let full_name = text(raw, CONTACT_FULL_NAME_KEYS)
        .or_else(|| join_name(first_name.as_deref(), last_name.as_deref()));

    let contact = NewContact {
        external_id,
        full_name,
        first_name,
        last_name,
        email: text(raw, CONTACT_EMAIL_KEYS),
        job_title: text(raw, CONTACT_JOB_TITLE_KEYS),
        phone: text(raw, CONTACT_PHONE_KEYS),
        linkedin_url: text(raw, LINKEDIN_KEYS),
        industry: text(raw, CONTACT_INDUSTRY_KEYS),
        lifecycle_status: text(raw, CONTACT_LIFECYCLE_KEYS),
        campaign_refs: campaign_refs(raw),
        raw_fields: raw_fields(raw, CONTACT_PROMOTED),
        company_id: None,
        owner_id: owner_id(raw),
        source_created_at: timestamp(raw, CREATED_AT_KEYS),
    };

    let hints = CompanyHints {
        external_id: text(raw, CONTACT_COMPANY_ID_KEYS),
        domain: text(raw, CONTACT_COMPANY_DOMAIN_KEYS).and_then(|d| clean_domain(&d)),
        name: text(raw, CONTACT_COMPANY_NAME_KEYS),
    };

    Ok(ContactRecord { contact, hints })
}

/// Best identifying label for a raw record, used when it cannot be mapped.
pub fn record_label(raw: &RawRecord) -> String {
    text(raw, ID_KEYS)
        .or_else(|| text(raw, &["name", "companyName", "email"]))
        .unwrap_or_else(|| "<unidentified>".to_string())
}

fn external_id(raw: &RawRecord) -> Result<String> {
    text(raw, ID_KEYS)
        .ok_or_else(|| MesError::InvalidInput("record has no _id or id field".to_string()))
}

/// Values for `key`: top level first, then the `fields` bag.
fn candidates<'a>(raw: &'a RawRecord, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    let top = raw.get(key);
    let bag = raw.get(FIELDS_BAG).and_then(Value::as_object).and_then(|bag| bag.get(key));
    top.into_iter().chain(bag).filter(|v| !v.is_null())
}

fn text(raw: &RawRecord, keys: &[&str]) -> Option<String> {
    keys.iter().flat_map(|key| candidates(raw, key)).find_map(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Identifier of a nested object (`{"_id": ...}`) or a scalar.
fn reference_text(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => ID_KEYS.iter().filter_map(|k| map.get(*k)).find_map(scalar_text),
        other => scalar_text(other),
    }
}

fn owner_id(raw: &RawRecord) -> Option<String> {
    OWNER_KEYS.iter().flat_map(|key| candidates(raw, key)).find_map(reference_text)
}

fn timestamp(raw: &RawRecord, keys: &[&str]) -> Option<DateTime<Utc>> {
    keys.iter().flat_map(|key| candidates(raw, key)).find_map(|value| match value {
        Value::String(s) => {
            DateTime::parse_from_rfc3339(s.trim()).ok().map(|dt| dt.with_timezone(&Utc))
        }
        Value::Number(n) => n.as_i64().and_then(epoch_to_datetime),
        _ => None,
    })
}

/// Epoch values above 10^11 are treated as milliseconds.
fn epoch_to_datetime(value: i64) -> Option<DateTime<Utc>> {
    if value.abs() > 100_000_000_000 {
        Utc.timestamp_millis_opt(value).single()
    } else {
        Utc.timestamp_opt(value, 0).single()
    }
}

fn campaign_refs(raw: &RawRecord) -> Vec<String> {
    let mut refs: Vec<String> = CONTACT_CAMPAIGN_KEYS
        .iter()
        .flat_map(|key| candidates(raw, key))
        .flat_map(|value| match value {
            Value::Array(items) => items.iter().filter_map(reference_text).collect::<Vec<_>>(),
            other => reference_text(other).into_iter().collect(),
        })
        .collect();

    refs.sort();
    refs.dedup();
    refs
}

fn join_name(first: Option<&str>, last: Option<&str>) -> Option<String> {
    let joined = [first, last].into_iter().flatten().collect::<Vec<_>>().join(" ");
    let trimmed = joined.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Reduce a domain or website URL to a lowercase host.
fn clean_domain(value: &str) -> Option<String> {
    let lowered = value.trim().to_ascii_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme.split(['/', '?', '#']).next().unwrap_or_default();

    (!host.is_empty()).then(|| host.to_string())
}

/// The `fields` bag plus unpromoted top-level keys. Bag entries win on clash.
fn raw_fields(raw: &RawRecord, promoted: &[&[&str]]) -> RawFields {
    let promoted: HashSet<&str> = promoted.iter().flat_map(|keys| keys.iter().copied()).collect();

    let mut fields = raw.get(FIELDS_BAG).and_then(Value::as_object).cloned().unwrap_or_default();

    for (key, value) in raw {
        if key == FIELDS_BAG || promoted.contains(key.as_str()) {
            continue;
        }
        fields.entry(key.clone()).or_insert_with(|| value.clone());
    }

    fields
}

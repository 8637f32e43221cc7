//! Contact → company resolution
//!
//! Resolution order is fixed: the source company id seen in this run, then a
//! normalised domain match, then a case-insensitive name match. A miss at one
//! step falls through to the next.

use std::collections::HashMap;

use mes_domain::constants::UNKNOWN_COMPANY_NAME;
use mes_domain::{normalize_domain, CompanyLinkKey};

/// Company references carried by a raw contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompanyHints {
    pub external_id: Option<String>,
    pub domain: Option<String>,
    pub name: Option<String>,
}

impl CompanyHints {
    pub fn is_empty(&self) -> bool {
        self.external_id.is_none() && self.domain.is_none() && self.name.is_none()
    }
}

/// Which step of the resolution order produced a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkStrategy {
    ExternalId,
    Domain,
    Name,
}

impl LinkStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExternalId => "external_id",
            Self::Domain => "domain",
            Self::Name => "name",
        }
    }
}

/// Lookup tables from source id, domain and lowercase name to local company id.
///
/// When two companies share a domain or name, the first one inserted wins.
#[derive(Debug, Clone, Default)]
pub struct CompanyIndex {
    by_external_id: HashMap<String, String>,
    by_domain: HashMap<String, String>,
    by_name: HashMap<String, String>,
}

impl CompanyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a source company id → local id pair from the current run.
    pub fn insert_external_id(&mut self, external_id: &str, local_id: &str) {
        self.by_external_id
            .entry(external_id.to_string())
            .or_insert_with(|| local_id.to_string());
    }

    /// Add domain and name keys for a stored company.
    pub fn insert_link_key(&mut self, key: &CompanyLinkKey) {
        if let Some(domain) = key.domain.as_deref().and_then(normalize_domain) {
            self.by_domain.entry(domain).or_insert_with(|| key.id.clone());
        }
        if let Some(name) = name_key(&key.name) {
            self.by_name.entry(name).or_insert_with(|| key.id.clone());
        }
    }

    pub fn extend_link_keys<'a>(&mut self, keys: impl IntoIterator<Item = &'a CompanyLinkKey>) {
        for key in keys {
            self.insert_link_key(key);
        }
    }

    pub fn resolve(&self, hints: &CompanyHints) -> Option<(String, LinkStrategy)> {
        if let Some(id) = hints.external_id.as_deref().and_then(|e| self.by_external_id.get(e)) {
            return Some((id.clone(), LinkStrategy::ExternalId));
        }

        if let Some(id) =
            hints.domain.as_deref().and_then(normalize_domain).and_then(|d| self.by_domain.get(&d))
        {
            return Some((id.clone(), LinkStrategy::Domain));
        }

        hints
            .name
            .as_deref()
            .and_then(name_key)
            .and_then(|n| self.by_name.get(&n))
            .map(|id| (id.clone(), LinkStrategy::Name))
    }

    pub fn is_empty(&self) -> bool {
        self.by_external_id.is_empty() && self.by_domain.is_empty() && self.by_name.is_empty()
    }
}

/// Placeholder names never match.
fn name_key(name: &str) -> Option<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(UNKNOWN_COMPANY_NAME) {
        return None;
    }
    Some(trimmed.to_lowercase())
}

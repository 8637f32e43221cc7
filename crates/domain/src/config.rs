//! Configuration management
//!
//! Every section has serde defaults so partial TOML/JSON files load cleanly.
//! Secrets are never serialized back out.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_BIND_ADDR, DEFAULT_COMPANIES_TABLE, DEFAULT_CONTACTS_TABLE, DEFAULT_DB_PATH,
    DEFAULT_DB_POOL_SIZE, DEFAULT_LEMLIST_BASE_URL, DEFAULT_LEMLIST_TIMEOUT_SECS,
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_STRIPE_BASE_URL,
};
use crate::types::{PaymentMode, PlanPrice};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreBackend,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub lemlist: LemlistConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub stripe: StripeConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Which store adapter the CRM mirror writes to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    #[default]
    Sqlite,
    Supabase,
}

crate::impl_domain_enum_conversions!(StoreBackend {
    Sqlite => "sqlite",
    Supabase => "supabase",
});

/// Local SQLite store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
    pub pool_size: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: DEFAULT_DB_PATH.to_string(), pool_size: DEFAULT_DB_POOL_SIZE }
    }
}

/// Lemlist source API configuration
///
/// The API key is optional at load time; its absence is the sync job's fatal
/// precondition, reported before any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LemlistConfig {
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    #[serde(default = "default_lemlist_base_url")]
    pub base_url: String,
    #[serde(default = "default_lemlist_timeout")]
    pub timeout_secs: u64,
}

impl Default for LemlistConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_lemlist_base_url(),
            timeout_secs: default_lemlist_timeout(),
        }
    }
}

fn default_lemlist_base_url() -> String {
    DEFAULT_LEMLIST_BASE_URL.to_string()
}

fn default_lemlist_timeout() -> u64 {
    DEFAULT_LEMLIST_TIMEOUT_SECS
}

/// Supabase (PostgREST) store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, skip_serializing)]
    pub service_key: Option<String>,
    #[serde(default = "default_companies_table")]
    pub companies_table: String,
    #[serde(default = "default_contacts_table")]
    pub contacts_table: String,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            service_key: None,
            companies_table: default_companies_table(),
            contacts_table: default_contacts_table(),
        }
    }
}

fn default_companies_table() -> String {
    DEFAULT_COMPANIES_TABLE.to_string()
}

fn default_contacts_table() -> String {
    DEFAULT_CONTACTS_TABLE.to_string()
}

/// Sync job tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Upper bound on pages fetched per collection, in case the source ignores
    /// the offset parameter.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self { page_size: default_page_size(), max_pages: default_max_pages() }
    }
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_max_pages() -> usize {
    DEFAULT_MAX_PAGES
}

/// Stripe checkout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StripeConfig {
    #[serde(default)]
    pub mode: PaymentMode,
    #[serde(default, skip_serializing)]
    pub test_secret_key: Option<String>,
    #[serde(default, skip_serializing)]
    pub live_secret_key: Option<String>,
    #[serde(default = "default_stripe_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub test_plans: BTreeMap<String, PlanPrice>,
    #[serde(default)]
    pub live_plans: BTreeMap<String, PlanPrice>,
}

impl Default for StripeConfig {
    fn default() -> Self {
        Self {
            mode: PaymentMode::default(),
            test_secret_key: None,
            live_secret_key: None,
            base_url: default_stripe_base_url(),
            test_plans: BTreeMap::new(),
            live_plans: BTreeMap::new(),
        }
    }
}

impl StripeConfig {
    /// Secret key for the configured mode, if present and non-blank.
    pub fn secret_key(&self) -> Option<&str> {
        let key = match self.mode {
            PaymentMode::Test => self.test_secret_key.as_deref(),
            PaymentMode::Live => self.live_secret_key.as_deref(),
        };
        key.filter(|k| !k.trim().is_empty())
    }

    /// Plan → price table for the configured mode.
    pub fn plans(&self) -> &BTreeMap<String, PlanPrice> {
        match self.mode {
            PaymentMode::Test => &self.test_plans,
            PaymentMode::Live => &self.live_plans,
        }
    }
}

fn default_stripe_base_url() -> String {
    DEFAULT_STRIPE_BASE_URL.to_string()
}

/// HTTP surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: default_bind_addr() }
    }
}

fn default_bind_addr() -> String {
    DEFAULT_BIND_ADDR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_json_uses_defaults() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.store, StoreBackend::Sqlite);
        assert_eq!(config.sync.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(config.lemlist.base_url, DEFAULT_LEMLIST_BASE_URL);
        assert_eq!(config.supabase.companies_table, "lemlist_companies");
        assert_eq!(config.stripe.mode, PaymentMode::Test);
        assert!(config.lemlist.api_key.is_none());
    }

    #[test]
    fn secrets_are_not_serialized() {
        let mut config = AppConfig::default();
        config.lemlist.api_key = Some("lem-secret".into());
        config.stripe.live_secret_key = Some("sk_live_secret".into());

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("lem-secret"));
        assert!(!json.contains("sk_live_secret"));
    }

    #[test]
    fn stripe_key_and_plans_follow_mode() {
        let mut stripe = StripeConfig {
            test_secret_key: Some("sk_test_1".into()),
            live_secret_key: Some("sk_live_1".into()),
            ..StripeConfig::default()
        };
        stripe
            .test_plans
            .insert("growth".into(), PlanPrice { price_id: "price_test".into(), recurring: true });
        stripe
            .live_plans
            .insert("growth".into(), PlanPrice { price_id: "price_live".into(), recurring: true });

        assert_eq!(stripe.secret_key(), Some("sk_test_1"));
        assert_eq!(stripe.plans()["growth"].price_id, "price_test");

        stripe.mode = PaymentMode::Live;
        assert_eq!(stripe.secret_key(), Some("sk_live_1"));
        assert_eq!(stripe.plans()["growth"].price_id, "price_live");
    }

    #[test]
    fn blank_secret_key_counts_as_missing() {
        let stripe = StripeConfig { test_secret_key: Some("  ".into()), ..StripeConfig::default() };
        assert_eq!(stripe.secret_key(), None);
    }
}

//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Loads `.env` from the working directory if present
//! 2. Attempts to build the configuration from environment variables
//! 3. If no store is configured there, falls back to a probed config file
//! 4. Secrets present in the environment always override file values
//!
//! ## Environment Variables
//! - `MES_STORE`: `sqlite` or `supabase` (inferred from `SUPABASE_URL` when unset)
//! - `MES_DB_PATH`, `MES_DB_POOL_SIZE`: SQLite store
//! - `SUPABASE_URL`, `SUPABASE_SERVICE_ROLE_KEY`: Supabase store
//! - `MES_SUPABASE_COMPANIES_TABLE`, `MES_SUPABASE_CONTACTS_TABLE`
//! - `LEMLIST_API_KEY`, `MES_LEMLIST_BASE_URL`, `MES_LEMLIST_TIMEOUT_SECS`
//! - `MES_SYNC_PAGE_SIZE`, `MES_SYNC_MAX_PAGES`
//! - `STRIPE_MODE`, `STRIPE_TEST_SECRET_KEY`, `STRIPE_LIVE_SECRET_KEY`
//! - `MES_STRIPE_BASE_URL`, `MES_STRIPE_TEST_PLANS`, `MES_STRIPE_LIVE_PLANS`
//!   (JSON objects of plan → `{"price_id": .., "recurring": ..}`)
//! - `MES_BIND_ADDR`: HTTP listen address
//!
//! `LEMLIST_API_KEY` is never required here; the sync job checks for it
//! before its first request.
//!
//! ## File Locations
//! `mes.toml`, `mes.json`, `config.toml`, `config.json` in the working
//! directory, its parent, then next to the executable.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use mes_domain::{AppConfig, MesError, PaymentMode, PlanPrice, Result, StoreBackend};

const CONFIG_FILE_NAMES: &[&str] = &["mes.toml", "mes.json", "config.toml", "config.json"];

/// Load configuration with automatic fallback strategy
///
/// # Errors
/// Returns `MesError::Config` if neither the environment nor a config file
/// yields a usable configuration.
pub fn load() -> Result<AppConfig> {
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!(path = %path.display(), "loaded .env file");
    }

    match load_from_env() {
        Ok(config) => {
            tracing::info!(store = %config.store, "configuration loaded from environment");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "environment incomplete, trying config file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// A store must be identifiable: `MES_DB_PATH` for SQLite or `SUPABASE_URL`
/// (plus `SUPABASE_SERVICE_ROLE_KEY`) for Supabase. Everything else falls
/// back to defaults.
///
/// # Errors
/// Returns `MesError::Config` if the store is unspecified or a variable has
/// an invalid value.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();

    let supabase_url = env_opt("SUPABASE_URL");
    config.store = match env_opt("MES_STORE") {
        Some(value) => parse_value("MES_STORE", &value)?,
        None if supabase_url.is_some() => StoreBackend::Supabase,
        None => StoreBackend::Sqlite,
    };

    match config.store {
        StoreBackend::Sqlite => {
            config.database.path = env_var("MES_DB_PATH")?;
        }
        StoreBackend::Supabase => {
            config.supabase.url = Some(supabase_url.ok_or_else(|| missing("SUPABASE_URL"))?);
            config.supabase.service_key = Some(env_var("SUPABASE_SERVICE_ROLE_KEY")?);
        }
    }
    if let Some(path) = env_opt("MES_DB_PATH") {
        config.database.path = path;
    }
    config.database.pool_size = env_parse("MES_DB_POOL_SIZE", config.database.pool_size)?;

    if let Some(table) = env_opt("MES_SUPABASE_COMPANIES_TABLE") {
        config.supabase.companies_table = table;
    }
    if let Some(table) = env_opt("MES_SUPABASE_CONTACTS_TABLE") {
        config.supabase.contacts_table = table;
    }

    if let Some(url) = env_opt("MES_LEMLIST_BASE_URL") {
        config.lemlist.base_url = url;
    }
    config.lemlist.timeout_secs =
        env_parse("MES_LEMLIST_TIMEOUT_SECS", config.lemlist.timeout_secs)?;

    config.sync.page_size = env_parse("MES_SYNC_PAGE_SIZE", config.sync.page_size)?;
    config.sync.max_pages = env_parse("MES_SYNC_MAX_PAGES", config.sync.max_pages)?;

    config.stripe.mode = env_parse("STRIPE_MODE", config.stripe.mode)?;
    if let Some(url) = env_opt("MES_STRIPE_BASE_URL") {
        config.stripe.base_url = url;
    }
    if let Some(plans) = env_plans("MES_STRIPE_TEST_PLANS")? {
        config.stripe.test_plans = plans;
    }
    if let Some(plans) = env_plans("MES_STRIPE_LIVE_PLANS")? {
        config.stripe.live_plans = plans;
    }

    if let Some(addr) = env_opt("MES_BIND_ADDR") {
        config.server.bind_addr = addr;
    }

    apply_secret_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations. JSON and TOML are
/// supported (detected by file extension). Secrets found in the environment
/// replace whatever the file holds.
///
/// # Errors
/// Returns `MesError::Config` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<AppConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(MesError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            MesError::Config(
                "No configuration found: set MES_DB_PATH or SUPABASE_URL, or provide mes.toml"
                    .to_string(),
            )
        })?,
    };

    tracing::info!(path = %config_path.display(), "loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| MesError::Config(format!("Failed to read config file: {e}")))?;

    let mut config = parse_config(&contents, &config_path)?;
    apply_secret_overrides(&mut config);
    validate(&config)?;
    Ok(config)
}

/// Parse configuration from string content, format chosen by extension.
fn parse_config(contents: &str, path: &Path) -> Result<AppConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| MesError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| MesError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(MesError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe the standard locations for a config file.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn apply_secret_overrides(config: &mut AppConfig) {
    if let Some(key) = env_opt("LEMLIST_API_KEY") {
        config.lemlist.api_key = Some(key);
    }
    if let Some(key) = env_opt("SUPABASE_SERVICE_ROLE_KEY") {
        config.supabase.service_key = Some(key);
    }
    if let Some(key) = env_opt("STRIPE_TEST_SECRET_KEY") {
        config.stripe.test_secret_key = Some(key);
    }
    if let Some(key) = env_opt("STRIPE_LIVE_SECRET_KEY") {
        config.stripe.live_secret_key = Some(key);
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.sync.page_size == 0 {
        return Err(MesError::Config("sync.page_size must be greater than zero".into()));
    }
    if config.sync.max_pages == 0 {
        return Err(MesError::Config("sync.max_pages must be greater than zero".into()));
    }
    if config.store == StoreBackend::Supabase && config.supabase.url.is_none() {
        return Err(MesError::Config("supabase store selected but supabase.url is not set".into()));
    }
    for (name, value) in [
        ("lemlist.base_url", Some(config.lemlist.base_url.as_str())),
        ("stripe.base_url", Some(config.stripe.base_url.as_str())),
        ("supabase.url", config.supabase.url.as_deref()),
    ] {
        if let Some(value) = value {
            url::Url::parse(value)
                .map_err(|e| MesError::Config(format!("{name} is not a valid URL: {e}")))?;
        }
    }
    Ok(())
}

/// Get required environment variable
fn env_var(key: &str) -> Result<String> {
    env_opt(key).ok_or_else(|| missing(key))
}

fn missing(key: &str) -> MesError {
    MesError::Config(format!("Missing required environment variable: {key}"))
}

/// Non-blank environment variable, trimmed.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(value) => parse_value(key, &value),
        None => Ok(default),
    }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse::<T>().map_err(|e| MesError::Config(format!("Invalid value for {key}: {e}")))
}

fn env_plans(key: &str) -> Result<Option<BTreeMap<String, PlanPrice>>> {
    env_opt(key)
        .map(|raw| {
            serde_json::from_str(&raw)
                .map_err(|e| MesError::Config(format!("Invalid plan table in {key}: {e}")))
        })
        .transpose()
}

//! Application context - dependency injection container

use std::sync::Arc;

use mes_core::{
    CheckoutGateway, CheckoutService, ContactSyncService, CrmSource, CrmStore, SyncOptions,
};
use mes_domain::{AppConfig, MesError, Result, StoreBackend};
use mes_infra::{
    DbManager, LemlistClient, SqliteCrmStore, StripeCheckoutGateway, SupabaseCrmStore,
};
use tokio::sync::{Mutex, MutexGuard};
use tracing::info;

use crate::utils::health::{ComponentHealth, HealthStatus};

/// Holds the configured adapters and the services built on them.
pub struct AppContext {
    pub config: AppConfig,
    pub store: Arc<dyn CrmStore>,
    pub source: Arc<dyn CrmSource>,
    pub sync_service: Arc<ContactSyncService>,
    pub checkout_service: Arc<CheckoutService>,

    /// One sync at a time per process.
    sync_guard: Mutex<()>,
}

impl AppContext {
    /// Build every adapter from configuration.
    ///
    /// The SQLite store is migrated here. A missing Lemlist key is not an
    /// error at this point; the sync run reports it.
    pub fn new(config: AppConfig) -> Result<Self> {
        let store = build_store(&config)?;
        let source: Arc<dyn CrmSource> = Arc::new(LemlistClient::new(&config.lemlist)?);
        let gateway: Arc<dyn CheckoutGateway> =
            Arc::new(StripeCheckoutGateway::new(&config.stripe.base_url)?);

        info!(
            store = %config.store,
            payment_mode = %config.stripe.mode,
            "application context initialised"
        );

        Ok(Self::from_parts(config, store, source, gateway))
    }

    /// Assemble a context from already-built adapters.
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn CrmStore>,
        source: Arc<dyn CrmSource>,
        gateway: Arc<dyn CheckoutGateway>,
    ) -> Self {
        let sync_service = Arc::new(ContactSyncService::with_options(
            Arc::clone(&source),
            Arc::clone(&store),
            SyncOptions::from(&config.sync),
        ));
        let checkout_service = Arc::new(CheckoutService::new(gateway, config.stripe.clone()));

        Self {
            config,
            store,
            source,
            sync_service,
            checkout_service,
            sync_guard: Mutex::new(()),
        }
    }

    /// Claim the in-process sync slot, or fail with `Conflict` if a run is
    /// already going. The slot is released when the guard drops.
    pub fn try_begin_sync(&self) -> Result<MutexGuard<'_, ()>> {
        self.sync_guard
            .try_lock()
            .map_err(|_| MesError::Conflict("sync already in progress".to_string()))
    }

    /// Probe the store and report which credentials are configured.
    pub async fn health_check(&self) -> HealthStatus {
        let mut status = HealthStatus::new()
            .add_component(self.check_store_health().await)
            .add_component(match self.source.ensure_credentials() {
                Ok(()) => ComponentHealth::healthy("lemlist"),
                Err(e) => ComponentHealth::unhealthy("lemlist", e.message()),
            })
            .add_component(match self.config.stripe.secret_key() {
                Some(_) => ComponentHealth::healthy("stripe"),
                None => ComponentHealth::unhealthy(
                    "stripe",
                    format!("no secret key for {} mode", self.config.stripe.mode),
                ),
            });

        status.calculate_score();
        status
    }

    async fn check_store_health(&self) -> ComponentHealth {
        match self.store.count_companies().await {
            Ok(_) => ComponentHealth::healthy("store"),
            Err(e) => {
                tracing::warn!(error = %e, "store health check failed");
                ComponentHealth::unhealthy("store", e.to_string())
            }
        }
    }
}

fn build_store(config: &AppConfig) -> Result<Arc<dyn CrmStore>> {
    match config.store {
        StoreBackend::Sqlite => {
            let db = Arc::new(DbManager::new(&config.database.path, config.database.pool_size)?);
            db.run_migrations()?;
            Ok(Arc::new(SqliteCrmStore::new(db)))
        }
        StoreBackend::Supabase => Ok(Arc::new(SupabaseCrmStore::new(&config.supabase)?)),
    }
}

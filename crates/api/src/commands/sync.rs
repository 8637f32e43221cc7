//! Lemlist contact sync command

use std::time::Instant;

use mes_domain::{Result, SyncEnvelope};
use tracing::info;

use crate::context::AppContext;
use crate::utils::logging::log_command_execution;

/// Run one contact sync and wrap the report in the success envelope.
///
/// Fails with `Conflict` if another sync is running in this process, or with
/// the sync job's fatal error (missing credentials, unreadable store).
/// Per-record failures are part of a successful envelope.
pub async fn sync_lemlist(ctx: &AppContext) -> Result<SyncEnvelope> {
    let command = "sync::sync_lemlist";
    let start = Instant::now();

    let result = match ctx.try_begin_sync() {
        Ok(_guard) => ctx.sync_service.run_sync().await.map(SyncEnvelope::from),
        Err(err) => Err(err),
    };

    if let Ok(envelope) = &result {
        info!(
            command,
            companies = envelope.report.companies_synced,
            contacts = envelope.report.contacts_synced,
            linked = envelope.report.contacts_linked,
            errors = envelope.report.errors.len(),
            "sync finished"
        );
    }
    log_command_execution(command, start.elapsed(), result.as_ref().err());

    result
}

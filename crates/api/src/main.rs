//! `mes` - Market Entry Secrets service binary
//!
//! `mes serve` exposes the HTTP routes; `mes sync` runs one Lemlist sync and
//! prints the result envelope.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mes_app::utils::logging::{init_tracing, LogFormat};
use mes_app::AppContext;
use mes_domain::{AppConfig, ErrorEnvelope};
use mes_infra::InstanceLock;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "mes")]
#[command(version, long_about = None)]
#[command(about = "Market Entry Secrets CRM mirror and checkout service")]
struct Cli {
    /// Config file (TOML or JSON); the environment is used when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON log lines (same as MES_LOG_FORMAT=json)
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the HTTP routes
    Serve {
        /// Listen address, overriding the configured one
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run one Lemlist contact sync and print the result as JSON
    Sync {
        /// Directory for the PID lock (defaults to the database directory)
        #[arg(long)]
        lock_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("{e:#}");
        println!("{}", envelope_json(&ErrorEnvelope::new(format!("{e:#}"))));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    let log_format =
        LogFormat::resolve(cli.json_logs, std::env::var("MES_LOG_FORMAT").ok().as_deref());
    init_tracing(log_format);

    if let Ok(path) = dotenv {
        debug!(path = %path.display(), "loaded .env file");
    }

    let config = load_config(cli.config).context("failed to load configuration")?;

    match cli.command {
        Commands::Serve { bind } => {
            let bind_addr = bind.unwrap_or_else(|| config.server.bind_addr.clone());
            let ctx = Arc::new(AppContext::new(config)?);
            mes_app::serve(ctx, &bind_addr).await?;
        }
        Commands::Sync { lock_dir } => {
            let lock_dir = lock_dir.unwrap_or_else(|| default_lock_dir(&config));
            let _lock = InstanceLock::acquire(&lock_dir)?;

            let ctx = AppContext::new(config)?;
            let envelope = mes_app::sync_lemlist(&ctx).await?;
            log_store_totals(&ctx).await;

            println!("{}", envelope_json(&envelope));
        }
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> mes_domain::Result<AppConfig> {
    match path {
        Some(path) => mes_infra::config::load_from_file(Some(path)),
        None => mes_infra::config::load(),
    }
}

fn default_lock_dir(config: &AppConfig) -> PathBuf {
    Path::new(&config.database.path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

async fn log_store_totals(ctx: &AppContext) {
    match (ctx.store.count_companies().await, ctx.store.count_contacts().await) {
        (Ok(companies), Ok(contacts)) => info!(companies, contacts, "store totals"),
        (Err(e), _) | (_, Err(e)) => warn!(error = %e, "failed to count stored rows"),
    }
}

fn envelope_json<T: serde::Serialize>(envelope: &T) -> String {
    serde_json::to_string_pretty(envelope).unwrap_or_else(|e| format!(r#"{{"error":"{e}"}}"#))
}

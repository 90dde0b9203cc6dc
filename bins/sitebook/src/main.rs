//! Sitebook command-line front end.
//!
//! Loads the snapshot stored under the configured sync id and prints
//! reports over it, or moves snapshots between document files and the
//! persistence gateway.

mod report;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use sitebook_core::document;
use sitebook_core::ledger::{LedgerStore, audit};
use sitebook_core::storage::{PersistenceGateway, open_gateway};
use sitebook_core::store::LedgerState;
use sitebook_core::sync::SyncScheduler;
use sitebook_shared::types::ProjectId;
use sitebook_shared::{AppConfig, AppError, LogConfig};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "sitebook", version, about = "Construction ledger reports and sync")]
struct Cli {
    /// Snapshot key; overrides `sync.sync_id`.
    #[arg(long, global = true)]
    sync_id: Option<String>,

    /// Print reports as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Project summaries and firm-wide totals.
    Summary,
    /// Material batches with stock left.
    Batches {
        /// Only batches sitting at this project.
        #[arg(long)]
        project: Option<ProjectId>,
    },
    /// Vendor payables.
    Vendors,
    /// Invoice collection status.
    Invoices,
    /// Check the snapshot for integrity violations.
    Audit,
    /// Write the snapshot to a document file.
    Export {
        /// Destination path.
        file: PathBuf,
    },
    /// Replace the stored snapshot with a document file.
    Import {
        /// Document to read.
        file: PathBuf,
    },
    /// Rewrite the stored snapshot in the current format.
    Push {
        /// Store under this sync id instead.
        #[arg(long)]
        to: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            let e = AppError::Config(e.to_string());
            eprintln!("error: {e}");
            return ExitCode::from(e.exit_code());
        }
    };
    init_tracing(&config.log);

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(e.downcast_ref::<AppError>().map_or(1, AppError::exit_code))
        }
    }
}

/// Logs go to stderr so report output stays pipeable.
fn init_tracing(log: &LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.filter));
    let json = log
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stderr));
    let plain = (!log.json).then(|| fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(plain)
        .init();
}

async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    let sync_id = cli.sync_id.unwrap_or(config.sync.sync_id);
    let debounce = Duration::from_millis(config.sync.debounce_ms);
    let gateway = open_gateway(&config.storage).map_err(AppError::from)?;

    let state = gateway
        .load_state(&sync_id)
        .await
        .map_err(AppError::from)?
        .unwrap_or_default();
    debug!(
        sync_id = %sync_id,
        backend = gateway.name(),
        revision = state.revision,
        "snapshot loaded"
    );

    match cli.command {
        Command::Summary => report::summary(&state, cli.json)?,
        Command::Batches { project } => report::batches(&state, project, cli.json)?,
        Command::Vendors => report::vendors(&state, cli.json)?,
        Command::Invoices => {
            report::invoices(&state, chrono::Local::now().date_naive(), cli.json)?;
        }
        Command::Audit => {
            let issues = audit(&state);
            report::issues(&issues, cli.json)?;
            if !issues.is_empty() {
                return Err(AppError::Integrity(format!(
                    "{} integrity issue(s) found",
                    issues.len()
                ))
                .into());
            }
        }
        Command::Export { file } => {
            let text = document::export(&state).map_err(AppError::from)?;
            tokio::fs::write(&file, text)
                .await
                .with_context(|| format!("writing {}", file.display()))?;
            info!(file = %file.display(), revision = state.revision, "snapshot exported");
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            let imported = document::import(&state, &text).map_err(AppError::from)?;
            publish(gateway, &sync_id, debounce, state, imported).await?;
        }
        Command::Push { to } => {
            let target = to.unwrap_or_else(|| sync_id.clone());
            let next = state.clone();
            publish(gateway, &target, debounce, state, next).await?;
        }
    }

    Ok(())
}

/// Publishes `next` through a sync task and waits for it to be written.
async fn publish(
    gateway: Arc<dyn PersistenceGateway>,
    sync_id: &str,
    debounce: Duration,
    current: LedgerState,
    next: LedgerState,
) -> anyhow::Result<()> {
    let scheduler = SyncScheduler::spawn(gateway, sync_id, debounce);
    let mut store = LedgerStore::new(current).with_sync(scheduler.handle());

    let issues = store.replace(next);
    let status = scheduler.shutdown().await;
    if let Some(message) = status.last_error {
        return Err(AppError::Storage(message).into());
    }

    println!(
        "stored revision {} under '{sync_id}' ({} integrity issue(s))",
        status.synced_revision.unwrap_or_default(),
        issues.len()
    );
    Ok(())
}

//! Wiring of the store, the archive directories and the services.

use crate::state::AppState;
use anyhow::{Context, Result};
use dropsend_core::hooks::{DownloadNotifier, NoOpDownloadNotifier};
use dropsend_core::Config;
use dropsend_db::{SqliteTransferStore, TransferStore};
use dropsend_services::{CompletionStateMachine, DownloadPipeline, TransferService};
use dropsend_storage::{ArchiveBuilder, ArchiveStorage, Dropbox, LocalArchiveStorage};
use sqlx::SqlitePool;
use std::sync::Arc;

pub async fn initialize_services(config: &Config, pool: SqlitePool) -> Result<Arc<AppState>> {
    initialize_services_with_notifier(config, pool, Arc::new(NoOpDownloadNotifier)).await
}

/// Same as [`initialize_services`] with a custom download notifier.
pub async fn initialize_services_with_notifier(
    config: &Config,
    pool: SqlitePool,
    notifier: Arc<dyn DownloadNotifier>,
) -> Result<Arc<AppState>> {
    let store: Arc<dyn TransferStore> = Arc::new(SqliteTransferStore::new(pool.clone()));

    let local = LocalArchiveStorage::new(config.transfers_directory())
        .await
        .with_context(|| {
            format!(
                "Failed to open transfers directory {}",
                config.transfers_directory().display()
            )
        })?;
    let archives: Arc<dyn ArchiveStorage> = Arc::new(local);

    let dropbox = Dropbox::new(config.dropbox_directory());
    if !dropbox.root().is_dir() {
        tracing::warn!(
            dropbox = %dropbox.root().display(),
            "Dropbox directory does not exist yet"
        );
    }

    let transfers = TransferService::new(
        store.clone(),
        archives.clone(),
        ArchiveBuilder::new(config.transfers_directory()),
        dropbox,
        config.list_transfers_limit(),
    );
    let downloads = DownloadPipeline::new(
        store,
        archives,
        CompletionStateMachine::new(config.complete_without_active_recipients()),
        notifier,
    );

    tracing::info!(
        transfers_directory = %config.transfers_directory().display(),
        dropbox_directory = %config.dropbox_directory().display(),
        complete_without_active_recipients = config.complete_without_active_recipients(),
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        pool,
        transfers,
        downloads,
    }))
}

//! Application state shared by all handlers.

use dropsend_core::Config;
use dropsend_services::{DownloadPipeline, TransferService};
use sqlx::SqlitePool;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    /// Management operations on transfers, recipients and the dropbox
    pub transfers: TransferService,
    /// Public link resolution and archive streaming
    pub downloads: DownloadPipeline,
}

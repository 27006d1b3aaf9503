//! Hooks and traits for download notifications
//!
//! The download pipeline calls a `DownloadNotifier` after every recorded download so that
//! an outer layer (e-mail to the sender, audit log, ...) can react without the core
//! depending on it. Notifier failures never fail a download.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// What happened during one recorded download.
#[derive(Debug, Clone)]
pub struct DownloadNotice {
    pub transfer_uuid: Uuid,
    /// Present when the download went through a recipient link.
    pub recipient_uuid: Option<Uuid>,
    pub sender_email: String,
    pub downloaded_at: DateTime<Utc>,
    /// The recipient went from pending to complete with this download.
    pub recipient_completed: bool,
    /// The transfer went from pending to complete with this download.
    pub transfer_completed: bool,
}

/// Trait for reacting to recorded downloads
#[async_trait]
pub trait DownloadNotifier: Send + Sync {
    async fn notify_download(&self, notice: &DownloadNotice) -> Result<(), String>;
}

/// No-op implementation used when nothing listens for downloads
pub struct NoOpDownloadNotifier;

#[async_trait]
impl DownloadNotifier for NoOpDownloadNotifier {
    async fn notify_download(&self, _notice: &DownloadNotice) -> Result<(), String> {
        Ok(())
    }
}

//! Download pipeline
//!
//! resolve -> gate -> archive check -> open -> record -> notify -> hand the stream back.
//! The download is recorded before the first byte goes out. The recording statements only
//! touch active rows, so a link revoked (or a transfer deleted) after resolution ends as
//! `NotFound` with nothing recorded. Once recorded, the archive handle is already open and
//! a transfer deleted afterwards still streams to the end.

use crate::access::is_accessible;
use crate::completion::{CompletionStateMachine, Transition};
use crate::resolver::{parse_token, IdentityResolver};
use chrono::Utc;
use dropsend_core::hooks::{DownloadNotice, DownloadNotifier};
use dropsend_core::models::Transfer;
use dropsend_core::AppError;
use dropsend_db::TransferStore;
use dropsend_storage::{ArchiveStorage, ByteStream};
use std::path::Path;
use std::sync::Arc;

pub const ARCHIVE_CONTENT_TYPE: &str = "application/zip";

/// An archive ready to be sent
pub struct ArchiveDownload {
    pub stream: ByteStream,
    pub size: u64,
    /// File name offered to the client
    pub filename: String,
    pub content_type: &'static str,
    pub transition: Transition,
}

impl std::fmt::Debug for ArchiveDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveDownload")
            .field("size", &self.size)
            .field("filename", &self.filename)
            .field("content_type", &self.content_type)
            .field("transition", &self.transition)
            .finish_non_exhaustive()
    }
}

/// Unknown and revoked links are indistinguishable here.
#[derive(Debug)]
pub enum DownloadOutcome {
    NotFound,
    Ready(ArchiveDownload),
}

/// `holidays` -> `holidays.zip`, `report.pdf` -> `report.pdf.zip`
pub fn download_filename(transfer: &Transfer) -> String {
    let label = Path::new(transfer.original_filename.trim_end_matches('/'))
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("transfer");
    format!("{}.zip", label)
}

#[derive(Clone)]
pub struct DownloadPipeline {
    store: Arc<dyn TransferStore>,
    archives: Arc<dyn ArchiveStorage>,
    resolver: IdentityResolver,
    completion: CompletionStateMachine,
    notifier: Arc<dyn DownloadNotifier>,
}

impl DownloadPipeline {
    pub fn new(
        store: Arc<dyn TransferStore>,
        archives: Arc<dyn ArchiveStorage>,
        completion: CompletionStateMachine,
        notifier: Arc<dyn DownloadNotifier>,
    ) -> Self {
        Self {
            resolver: IdentityResolver::new(store.clone()),
            store,
            archives,
            completion,
            notifier,
        }
    }

    pub fn resolver(&self) -> &IdentityResolver {
        &self.resolver
    }

    #[tracing::instrument(skip(self))]
    pub async fn stream(&self, token: &str) -> Result<DownloadOutcome, AppError> {
        let Some(token) = parse_token(token) else {
            return Ok(DownloadOutcome::NotFound);
        };

        let resolved = self.resolver.resolve(token).await?;
        if !is_accessible(resolved.recipient.as_ref(), resolved.transfer.as_ref()) {
            return Ok(DownloadOutcome::NotFound);
        }
        let (recipient, transfer) = match resolved.transfer {
            Some(transfer) => (resolved.recipient, transfer),
            None => return Ok(DownloadOutcome::NotFound),
        };

        if !self.archives.exists(&transfer.archive_filename).await? {
            tracing::error!(
                transfer = %transfer.uuid,
                archive = %transfer.archive_filename,
                "Archive of an active transfer is missing"
            );
            return Err(AppError::ArchiveMissing(transfer.archive_filename.clone()));
        }

        let size = self.archives.content_length(&transfer.archive_filename).await?;
        let stream = self.archives.open_stream(&transfer.archive_filename).await?;

        let now = Utc::now();
        let mut tx = self.store.begin_download().await?;
        let Some(transition) = self
            .completion
            .record_download(&mut *tx, recipient.as_ref(), &transfer, now)
            .await?
        else {
            tracing::info!(
                transfer = %transfer.uuid,
                recipient = ?recipient.as_ref().map(|r| r.uuid),
                "Link revoked or transfer deleted before the download was recorded"
            );
            return Ok(DownloadOutcome::NotFound);
        };
        tx.commit().await?;

        tracing::info!(
            transfer = %transfer.uuid,
            recipient = ?recipient.as_ref().map(|r| r.uuid),
            size_bytes = size,
            recipient_completed = transition.recipient_completed,
            transfer_completed = transition.transfer_completed,
            "Download started"
        );

        let notice = DownloadNotice {
            transfer_uuid: transfer.uuid,
            recipient_uuid: recipient.as_ref().map(|r| r.uuid),
            sender_email: transfer.email.clone(),
            downloaded_at: now,
            recipient_completed: transition.recipient_completed,
            transfer_completed: transition.transfer_completed,
        };
        if let Err(e) = self.notifier.notify_download(&notice).await {
            tracing::warn!(error = %e, transfer = %transfer.uuid, "Download notifier failed");
        }

        Ok(DownloadOutcome::Ready(ArchiveDownload {
            stream,
            size,
            filename: download_filename(&transfer),
            content_type: ARCHIVE_CONTENT_TYPE,
            transition,
        }))
    }
}

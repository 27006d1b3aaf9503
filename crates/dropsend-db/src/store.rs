//! Store abstraction
//!
//! Services only see `Arc<dyn TransferStore>`. Download bookkeeping goes through a
//! `DownloadTransaction` so that log appends, the recipient snapshot and the completion
//! update commit together.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dropsend_core::models::{
    NewRecipient, NewTransfer, Recipient, RecipientState, RecipientUpdate, Transfer,
    TransferPage, TransferUpdate,
};
use dropsend_core::AppError;
use uuid::Uuid;

/// Result of appending a download to a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppendOutcome {
    /// Length of the download log after the append
    pub download_count: usize,
    /// `complete` as seen inside the transaction, after this statement
    pub complete: bool,
}

#[async_trait]
pub trait TransferStore: Send + Sync {
    async fn find_recipient_by_uuid(&self, uuid: Uuid) -> Result<Option<Recipient>, AppError>;

    async fn find_transfer_by_uuid(&self, uuid: Uuid) -> Result<Option<Transfer>, AppError>;

    async fn find_transfer_by_pk(&self, pk: i64) -> Result<Option<Transfer>, AppError>;

    /// Recipients of a transfer, ordered by email
    async fn list_recipients(&self, transfer_pk: i64) -> Result<Vec<Recipient>, AppError>;

    async fn list_transfers(&self, page: &TransferPage) -> Result<Vec<Transfer>, AppError>;

    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Transfer, AppError>;

    /// `Ok(None)` when no transfer has this uuid. An empty update is a validation failure.
    async fn update_transfer(
        &self,
        uuid: Uuid,
        update: &TransferUpdate,
    ) -> Result<Option<Transfer>, AppError>;

    /// Delete a transfer and, by cascade, its recipients. Returns the deleted row.
    async fn delete_transfer(&self, uuid: Uuid) -> Result<Option<Transfer>, AppError>;

    async fn create_recipient(&self, recipient: NewRecipient) -> Result<Recipient, AppError>;

    async fn update_recipient(
        &self,
        uuid: Uuid,
        update: &RecipientUpdate,
    ) -> Result<Option<Recipient>, AppError>;

    async fn begin_download(&self) -> Result<Box<dyn DownloadTransaction>, AppError>;
}

/// One download being recorded. Dropping it without `commit` rolls everything back.
///
/// Implementations must make the first statement a write so that concurrent downloads of
/// the same transfer serialize on the write lock instead of reading stale snapshots.
#[async_trait]
pub trait DownloadTransaction: Send {
    /// Append `at` to the recipient's log and mark the recipient complete.
    ///
    /// `complete` in the outcome is the value *before* this download. `Ok(None)` when the
    /// recipient is gone or no longer active.
    async fn append_recipient_download(
        &mut self,
        recipient_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<AppendOutcome>, AppError>;

    /// Append `at` to the transfer's own log. `Ok(None)` when the transfer is gone or no
    /// longer active.
    async fn append_transfer_download(
        &mut self,
        transfer_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<AppendOutcome>, AppError>;

    /// Active/complete flags of every recipient of the transfer, read inside the transaction.
    async fn recipient_states(&mut self, transfer_pk: i64)
        -> Result<Vec<RecipientState>, AppError>;

    /// Set `complete` on a transfer that is not complete yet. Returns whether this call did it.
    async fn mark_transfer_complete(
        &mut self,
        transfer_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError>;

    async fn commit(self: Box<Self>) -> Result<(), AppError>;
}

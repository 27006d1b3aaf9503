//! Completion state machine
//!
//! Recipients and transfers both go one way, `Pending -> Complete`. Every download appends
//! to the download logs; a transfer becomes complete once every *active* recipient has
//! downloaded. The whole update runs in one `DownloadTransaction`.

use chrono::{DateTime, Utc};
use dropsend_core::models::{Recipient, RecipientState, Transfer};
use dropsend_core::AppError;
use dropsend_db::DownloadTransaction;

/// What one recorded download changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Transition {
    /// The recipient went from pending to complete.
    pub recipient_completed: bool,
    /// The transfer went from pending to complete.
    pub transfer_completed: bool,
    /// Length of the recipient's log after the download, for recipient links.
    pub recipient_downloads: Option<usize>,
    pub transfer_downloads: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionStateMachine {
    complete_without_active_recipients: bool,
}

impl Default for CompletionStateMachine {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Inactive recipients are ignored whether or not they downloaded.
pub fn transfer_completion_holds(
    recipients: &[RecipientState],
    complete_without_active_recipients: bool,
) -> bool {
    let mut active = recipients.iter().filter(|r| r.active).peekable();
    if active.peek().is_none() {
        return complete_without_active_recipients;
    }
    active.all(|r| r.complete)
}

impl CompletionStateMachine {
    pub fn new(complete_without_active_recipients: bool) -> Self {
        Self {
            complete_without_active_recipients,
        }
    }

    /// Record one download of `transfer`, through `recipient` when the link was a
    /// recipient link. Nothing is committed here.
    ///
    /// `Ok(None)` when the transfer or the recipient was deactivated or deleted since it was
    /// resolved; the transaction must then be dropped.
    #[tracing::instrument(skip_all, fields(transfer = %transfer.uuid, recipient = ?recipient.map(|r| r.uuid)))]
    pub async fn record_download(
        &self,
        tx: &mut dyn DownloadTransaction,
        recipient: Option<&Recipient>,
        transfer: &Transfer,
        at: DateTime<Utc>,
    ) -> Result<Option<Transition>, AppError> {
        let mut transition = Transition::default();

        if let Some(recipient) = recipient {
            let Some(outcome) = tx.append_recipient_download(recipient.pk, at).await? else {
                return Ok(None);
            };
            transition.recipient_completed = !outcome.complete;
            transition.recipient_downloads = Some(outcome.download_count);
        }

        let Some(outcome) = tx.append_transfer_download(transfer.pk, at).await? else {
            return Ok(None);
        };
        transition.transfer_downloads = outcome.download_count;

        if !outcome.complete {
            let states = tx.recipient_states(transfer.pk).await?;
            if transfer_completion_holds(&states, self.complete_without_active_recipients) {
                transition.transfer_completed = tx.mark_transfer_complete(transfer.pk, at).await?;
            }
        }

        tracing::debug!(
            recipient_completed = transition.recipient_completed,
            transfer_completed = transition.transfer_completed,
            transfer_downloads = transition.transfer_downloads,
            "Download recorded"
        );

        Ok(Some(transition))
    }
}

//! Identity resolution and the human-facing resolution view.

use crate::access::is_accessible;
use dropsend_core::models::{Recipient, Transfer};
use dropsend_core::AppError;
use dropsend_db::TransferStore;
use std::sync::Arc;
use uuid::Uuid;

/// What an access token points to
#[derive(Debug, Clone, Default)]
pub struct ResolvedToken {
    pub recipient: Option<Recipient>,
    pub transfer: Option<Transfer>,
}

/// Outcome of looking at a link without downloading
#[derive(Debug, Clone)]
pub enum Resolution {
    NotFound,
    /// The link exists but the transfer or the recipient was deactivated.
    Inaccessible,
    Accessible {
        recipient: Option<Recipient>,
        transfer: Transfer,
    },
}

/// Tokens are UUIDs; anything else cannot match.
pub fn parse_token(token: &str) -> Option<Uuid> {
    Uuid::parse_str(token.trim()).ok()
}

#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn TransferStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn TransferStore>) -> Self {
        Self { store }
    }

    /// Map a token to a recipient and its transfer, or to a transfer alone.
    ///
    /// A recipient token wins over a transfer with the same uuid.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, token: Uuid) -> Result<ResolvedToken, AppError> {
        if let Some(recipient) = self.store.find_recipient_by_uuid(token).await? {
            let transfer = self
                .store
                .find_transfer_by_pk(recipient.transfer_pk)
                .await?
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "Recipient {} references missing transfer {}",
                        recipient.uuid, recipient.transfer_pk
                    ))
                })?;
            return Ok(ResolvedToken {
                recipient: Some(recipient),
                transfer: Some(transfer),
            });
        }

        let transfer = self.store.find_transfer_by_uuid(token).await?;
        Ok(ResolvedToken {
            recipient: None,
            transfer,
        })
    }

    /// Resolve and gate a raw token, with no state change.
    pub async fn view(&self, token: &str) -> Result<Resolution, AppError> {
        let Some(token) = parse_token(token) else {
            return Ok(Resolution::NotFound);
        };

        let resolved = self.resolve(token).await?;
        let accessible = is_accessible(resolved.recipient.as_ref(), resolved.transfer.as_ref());

        Ok(match resolved.transfer {
            None => Resolution::NotFound,
            Some(_) if !accessible => Resolution::Inaccessible,
            Some(transfer) => Resolution::Accessible {
                recipient: resolved.recipient,
                transfer,
            },
        })
    }
}

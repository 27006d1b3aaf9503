use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::Recipient;

/// A bundled file or folder shared by a sender with zero or more recipients
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Transfer {
    /// Store-owned ordinal identity, never exposed.
    #[serde(skip_serializing)]
    pub pk: i64,
    pub uuid: Uuid,
    /// Sender contact
    pub email: String,
    pub object: String,
    pub message: String,
    /// Name of the dropbox entry the archive was built from
    pub original_filename: String,
    pub archive_filename: String,
    pub archive_size: i64,
    pub complete: bool,
    pub active: bool,
    pub download_dates: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Transfer with its recipients, ordered by email
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferDetail {
    #[serde(flatten)]
    pub transfer: Transfer,
    pub recipients: Vec<Recipient>,
}

/// Fields of a transfer row about to be inserted. The archive is already on disk.
#[derive(Debug, Clone)]
pub struct NewTransfer {
    pub uuid: Uuid,
    pub email: String,
    pub object: String,
    pub message: String,
    pub original_filename: String,
    pub archive_filename: String,
    pub archive_size: i64,
    pub created_at: DateTime<Utc>,
}

/// Sender-updatable transfer fields. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferUpdate {
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl TransferUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.active.is_none()
    }
}

/// Keyset page over transfers, by `pk`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPage {
    pub limit: i64,
    pub cursor: Option<i64>,
    /// Walk towards newer transfers (ascending `pk`) instead of older ones.
    pub before: bool,
}

/// Request DTO for creating a transfer
///
/// Fields stay optional so that missing and blank values are reported per field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateTransferRequest {
    pub email: Option<String>,
    pub object: Option<String>,
    pub message: Option<String>,
    /// Name of a file or directory in the dropbox
    pub dropfile: Option<String>,
}

/// Request DTO for updating a transfer
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTransferRequest {
    pub email: Option<String>,
    #[schema(value_type = Option<bool>)]
    pub active: Option<serde_json::Value>,
}

/// Query parameters for listing transfers
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTransfersQuery {
    pub limit: Option<i64>,
    /// `pk` cursor returned by a previous page (`next_cursor`)
    pub cursor: Option<i64>,
    #[serde(default)]
    pub before: bool,
}

/// One page of transfers
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TransferListResponse {
    pub transfers: Vec<Transfer>,
    /// Cursor for the next page, absent on the last page
    pub next_cursor: Option<i64>,
}

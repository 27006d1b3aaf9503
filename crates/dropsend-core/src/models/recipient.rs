use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A person a transfer was shared with; their `uuid` is their download token.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Recipient {
    #[serde(skip_serializing)]
    pub pk: i64,
    pub uuid: Uuid,
    pub email: String,
    /// `pk` of the owning transfer
    #[serde(skip_serializing)]
    pub transfer_pk: i64,
    pub complete: bool,
    pub active: bool,
    pub download_dates: Vec<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Completion-relevant view of a recipient, read inside a download transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecipientState {
    pub pk: i64,
    pub active: bool,
    pub complete: bool,
}

impl From<&Recipient> for RecipientState {
    fn from(recipient: &Recipient) -> Self {
        RecipientState {
            pk: recipient.pk,
            active: recipient.active,
            complete: recipient.complete,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewRecipient {
    pub uuid: Uuid,
    pub email: String,
    pub transfer_pk: i64,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Admin-updatable recipient fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientUpdate {
    pub active: Option<bool>,
}

impl RecipientUpdate {
    pub fn is_empty(&self) -> bool {
        self.active.is_none()
    }
}

/// Request DTO for creating a recipient
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateRecipientRequest {
    pub email: Option<String>,
    /// UUID of the transfer to share
    pub transfer: Option<String>,
    #[schema(value_type = Option<bool>)]
    pub active: Option<serde_json::Value>,
}

/// Request DTO for updating a recipient
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateRecipientRequest {
    #[schema(value_type = Option<bool>)]
    pub active: Option<serde_json::Value>,
}

//! Row types and the column lists they are selected with.
//!
//! Download logs are stored as JSON arrays of RFC 3339 strings with a fixed (microsecond,
//! `Z` suffix) format, so that text comparison matches time order.

use chrono::{DateTime, SecondsFormat, Utc};
use dropsend_core::models::{Recipient, Transfer};
use dropsend_core::AppError;
use sqlx::FromRow;
use uuid::Uuid;

macro_rules! transfer_columns {
    () => {
        "pk, uuid, email, object, message, original_filename, archive_filename, archive_size, \
         complete, active, download_dates, created_at, updated_at"
    };
}

macro_rules! recipient_columns {
    () => {
        "pk, uuid, email, transfer AS transfer_pk, complete, active, download_dates, \
         created_at, updated_at"
    };
}

pub(crate) use recipient_columns;
pub(crate) use transfer_columns;

/// Format a timestamp the way download logs store it.
pub(crate) fn log_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_log(raw: &str) -> Result<Vec<DateTime<Utc>>, AppError> {
    Ok(serde_json::from_str(raw)?)
}

#[derive(Debug, FromRow)]
pub(crate) struct TransferRow {
    pk: i64,
    uuid: Uuid,
    email: String,
    object: String,
    message: String,
    original_filename: String,
    archive_filename: String,
    archive_size: i64,
    complete: bool,
    active: bool,
    download_dates: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<TransferRow> for Transfer {
    type Error = AppError;

    fn try_from(row: TransferRow) -> Result<Self, Self::Error> {
        Ok(Transfer {
            download_dates: parse_log(&row.download_dates)?,
            pk: row.pk,
            uuid: row.uuid,
            email: row.email,
            object: row.object,
            message: row.message,
            original_filename: row.original_filename,
            archive_filename: row.archive_filename,
            archive_size: row.archive_size,
            complete: row.complete,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct RecipientRow {
    pk: i64,
    uuid: Uuid,
    email: String,
    transfer_pk: i64,
    complete: bool,
    active: bool,
    download_dates: String,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RecipientRow> for Recipient {
    type Error = AppError;

    fn try_from(row: RecipientRow) -> Result<Self, Self::Error> {
        Ok(Recipient {
            download_dates: parse_log(&row.download_dates)?,
            pk: row.pk,
            uuid: row.uuid,
            email: row.email,
            transfer_pk: row.transfer_pk,
            complete: row.complete,
            active: row.active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `(complete, json_array_length(download_dates))` returned by log appends
#[derive(Debug, FromRow)]
pub(crate) struct AppendRow {
    pub complete: bool,
    pub download_count: i64,
}

use super::download::SqliteDownloadTransaction;
use super::rows::{recipient_columns, transfer_columns, RecipientRow, TransferRow};
use crate::store::{DownloadTransaction, TransferStore};
use async_trait::async_trait;
use chrono::Utc;
use dropsend_core::models::{
    NewRecipient, NewTransfer, Recipient, RecipientUpdate, Transfer, TransferPage, TransferUpdate,
};
use dropsend_core::validation::requests::NOTHING_TO_UPDATE;
use dropsend_core::{AppError, FieldError};
use sqlx::{Sqlite, SqlitePool};
use uuid::Uuid;

/// `TransferStore` backed by SQLite
#[derive(Clone)]
pub struct SqliteTransferStore {
    pool: SqlitePool,
}

impl SqliteTransferStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn nothing_to_update() -> AppError {
    AppError::Validation(vec![FieldError::non_field(NOTHING_TO_UPDATE)])
}

fn transfers(rows: Vec<TransferRow>) -> Result<Vec<Transfer>, AppError> {
    rows.into_iter().map(Transfer::try_from).collect()
}

#[async_trait]
impl TransferStore for SqliteTransferStore {
    #[tracing::instrument(skip(self), fields(db.table = "recipients", db.operation = "select", db.record_id = %uuid))]
    async fn find_recipient_by_uuid(&self, uuid: Uuid) -> Result<Option<Recipient>, AppError> {
        let row = sqlx::query_as::<Sqlite, RecipientRow>(concat!(
            "SELECT ",
            recipient_columns!(),
            " FROM recipients WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Recipient::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "select", db.record_id = %uuid))]
    async fn find_transfer_by_uuid(&self, uuid: Uuid) -> Result<Option<Transfer>, AppError> {
        let row = sqlx::query_as::<Sqlite, TransferRow>(concat!(
            "SELECT ",
            transfer_columns!(),
            " FROM transfers WHERE uuid = ?"
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transfer::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "select"))]
    async fn find_transfer_by_pk(&self, pk: i64) -> Result<Option<Transfer>, AppError> {
        let row = sqlx::query_as::<Sqlite, TransferRow>(concat!(
            "SELECT ",
            transfer_columns!(),
            " FROM transfers WHERE pk = ?"
        ))
        .bind(pk)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transfer::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "recipients", db.operation = "select"))]
    async fn list_recipients(&self, transfer_pk: i64) -> Result<Vec<Recipient>, AppError> {
        let rows = sqlx::query_as::<Sqlite, RecipientRow>(concat!(
            "SELECT ",
            recipient_columns!(),
            " FROM recipients WHERE transfer = ? ORDER BY email ASC, pk ASC"
        ))
        .bind(transfer_pk)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Recipient::try_from).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "select"))]
    async fn list_transfers(&self, page: &TransferPage) -> Result<Vec<Transfer>, AppError> {
        let rows = if page.before {
            sqlx::query_as::<Sqlite, TransferRow>(concat!(
                "SELECT ",
                transfer_columns!(),
                " FROM transfers WHERE (?1 IS NULL OR pk > ?1) ORDER BY pk ASC LIMIT ?2"
            ))
            .bind(page.cursor)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<Sqlite, TransferRow>(concat!(
                "SELECT ",
                transfer_columns!(),
                " FROM transfers WHERE (?1 IS NULL OR pk < ?1) ORDER BY pk DESC LIMIT ?2"
            ))
            .bind(page.cursor)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?
        };

        transfers(rows)
    }

    #[tracing::instrument(skip(self, transfer), fields(db.table = "transfers", db.operation = "insert", db.record_id = %transfer.uuid))]
    async fn create_transfer(&self, transfer: NewTransfer) -> Result<Transfer, AppError> {
        let row = sqlx::query_as::<Sqlite, TransferRow>(concat!(
            "INSERT INTO transfers (uuid, email, object, message, original_filename, ",
            "archive_filename, archive_size, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING ",
            transfer_columns!()
        ))
        .bind(transfer.uuid)
        .bind(&transfer.email)
        .bind(&transfer.object)
        .bind(&transfer.message)
        .bind(&transfer.original_filename)
        .bind(&transfer.archive_filename)
        .bind(transfer.archive_size)
        .bind(transfer.created_at)
        .fetch_one(&self.pool)
        .await?;

        Transfer::try_from(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "update", db.record_id = %uuid))]
    async fn update_transfer(
        &self,
        uuid: Uuid,
        update: &TransferUpdate,
    ) -> Result<Option<Transfer>, AppError> {
        if update.is_empty() {
            return Err(nothing_to_update());
        }

        let row = sqlx::query_as::<Sqlite, TransferRow>(concat!(
            "UPDATE transfers SET email = COALESCE(?1, email), active = COALESCE(?2, active), ",
            "updated_at = ?3 WHERE uuid = ?4 RETURNING ",
            transfer_columns!()
        ))
        .bind(update.email.as_deref())
        .bind(update.active)
        .bind(Utc::now())
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transfer::try_from).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "delete", db.record_id = %uuid))]
    async fn delete_transfer(&self, uuid: Uuid) -> Result<Option<Transfer>, AppError> {
        let row = sqlx::query_as::<Sqlite, TransferRow>(concat!(
            "DELETE FROM transfers WHERE uuid = ? RETURNING ",
            transfer_columns!()
        ))
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Transfer::try_from).transpose()
    }

    #[tracing::instrument(skip(self, recipient), fields(db.table = "recipients", db.operation = "insert", db.record_id = %recipient.uuid))]
    async fn create_recipient(&self, recipient: NewRecipient) -> Result<Recipient, AppError> {
        let row = sqlx::query_as::<Sqlite, RecipientRow>(concat!(
            "INSERT INTO recipients (uuid, email, transfer, active, created_at) ",
            "VALUES (?, ?, ?, ?, ?) RETURNING ",
            recipient_columns!()
        ))
        .bind(recipient.uuid)
        .bind(&recipient.email)
        .bind(recipient.transfer_pk)
        .bind(recipient.active)
        .bind(recipient.created_at)
        .fetch_one(&self.pool)
        .await?;

        Recipient::try_from(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "recipients", db.operation = "update", db.record_id = %uuid))]
    async fn update_recipient(
        &self,
        uuid: Uuid,
        update: &RecipientUpdate,
    ) -> Result<Option<Recipient>, AppError> {
        if update.is_empty() {
            return Err(nothing_to_update());
        }

        let row = sqlx::query_as::<Sqlite, RecipientRow>(concat!(
            "UPDATE recipients SET active = COALESCE(?1, active), updated_at = ?2 ",
            "WHERE uuid = ?3 RETURNING ",
            recipient_columns!()
        ))
        .bind(update.active)
        .bind(Utc::now())
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Recipient::try_from).transpose()
    }

    async fn begin_download(&self) -> Result<Box<dyn DownloadTransaction>, AppError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteDownloadTransaction::new(tx)))
    }
}

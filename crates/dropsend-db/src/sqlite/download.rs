use super::rows::{log_timestamp, AppendRow};
use crate::store::{AppendOutcome, DownloadTransaction};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dropsend_core::models::RecipientState;
use dropsend_core::AppError;
use sqlx::{Sqlite, Transaction};

/// Append `?1` to `download_dates`, clamped to the last entry so the log never goes back
/// in time. Only active rows are touched. Shared by both tables.
macro_rules! append_download {
    ($table:literal) => {
        concat!(
            "UPDATE ",
            $table,
            " SET download_dates = json_insert(download_dates, '$[#]', ",
            "CASE WHEN json_array_length(download_dates) > 0 ",
            "AND json_extract(download_dates, '$[#-1]') > ?1 ",
            "THEN json_extract(download_dates, '$[#-1]') ELSE ?1 END), ",
            "updated_at = ?2 WHERE pk = ?3 AND active = 1 ",
            "RETURNING complete, json_array_length(download_dates) AS download_count"
        )
    };
}

pub struct SqliteDownloadTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteDownloadTransaction {
    pub(crate) fn new(tx: Transaction<'static, Sqlite>) -> Self {
        Self { tx }
    }

    async fn append(
        &mut self,
        sql: &'static str,
        pk: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<AppendOutcome>, AppError> {
        let row = sqlx::query_as::<Sqlite, AppendRow>(sql)
            .bind(log_timestamp(at))
            .bind(at)
            .bind(pk)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|row| AppendOutcome {
            download_count: usize::try_from(row.download_count).unwrap_or_default(),
            complete: row.complete,
        }))
    }
}

#[async_trait]
impl DownloadTransaction for SqliteDownloadTransaction {
    #[tracing::instrument(skip(self), fields(db.table = "recipients", db.operation = "update"))]
    async fn append_recipient_download(
        &mut self,
        recipient_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<AppendOutcome>, AppError> {
        let Some(outcome) = self
            .append(append_download!("recipients"), recipient_pk, at)
            .await?
        else {
            return Ok(None);
        };

        sqlx::query("UPDATE recipients SET complete = 1 WHERE pk = ? AND complete = 0")
            .bind(recipient_pk)
            .execute(&mut *self.tx)
            .await?;

        Ok(Some(outcome))
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "update"))]
    async fn append_transfer_download(
        &mut self,
        transfer_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<Option<AppendOutcome>, AppError> {
        self.append(append_download!("transfers"), transfer_pk, at)
            .await
    }

    #[tracing::instrument(skip(self), fields(db.table = "recipients", db.operation = "select"))]
    async fn recipient_states(
        &mut self,
        transfer_pk: i64,
    ) -> Result<Vec<RecipientState>, AppError> {
        let rows = sqlx::query_as::<Sqlite, (i64, bool, bool)>(
            "SELECT pk, active, complete FROM recipients WHERE transfer = ?",
        )
        .bind(transfer_pk)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(pk, active, complete)| RecipientState {
                pk,
                active,
                complete,
            })
            .collect())
    }

    #[tracing::instrument(skip(self), fields(db.table = "transfers", db.operation = "update"))]
    async fn mark_transfer_complete(
        &mut self,
        transfer_pk: i64,
        at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE transfers SET complete = 1, updated_at = ? WHERE pk = ? AND complete = 0",
        )
        .bind(at)
        .bind(transfer_pk)
        .execute(&mut *self.tx)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn commit(self: Box<Self>) -> Result<(), AppError> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }
}

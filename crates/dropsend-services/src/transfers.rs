//! Transfer lifecycle: creation with its archive, sender updates, deletion, recipients.
//!
//! Keeps handler logic thin and allows testing without HTTP.

use chrono::Utc;
use dropsend_core::models::{
    CreateRecipientRequest, CreateTransferRequest, DropboxEntry, ListTransfersQuery, NewRecipient,
    NewTransfer, Recipient, Transfer, TransferDetail, TransferListResponse, TransferPage,
    UpdateRecipientRequest, UpdateTransferRequest,
};
use dropsend_core::validation::requests::{INVALID_DROPFILE, INVALID_TRANSFER};
use dropsend_core::validation::{
    validate_create_recipient, validate_create_transfer, validate_update_recipient,
    validate_update_transfer,
};
use dropsend_core::AppError;
use dropsend_db::TransferStore;
use dropsend_storage::{ArchiveBuilder, ArchiveStorage, Dropbox, StorageError};
use std::sync::Arc;
use uuid::Uuid;

pub const TRANSFER_NOT_FOUND: &str = "The transfer you are looking for could not be retrieved.";
pub const TRANSFER_UPDATE_NOT_FOUND: &str =
    "The transfer you want to update could not be retrieved.";
pub const TRANSFER_DELETE_NOT_FOUND: &str =
    "The transfer you want to delete could not be retrieved.";
pub const RECIPIENT_UPDATE_NOT_FOUND: &str =
    "The recipient you want to update could not be retrieved.";

fn parse_id(id: &str, not_found: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(not_found.to_string()))
}

#[derive(Clone)]
pub struct TransferService {
    store: Arc<dyn TransferStore>,
    archives: Arc<dyn ArchiveStorage>,
    builder: ArchiveBuilder,
    dropbox: Dropbox,
    list_limit: i64,
}

impl TransferService {
    pub fn new(
        store: Arc<dyn TransferStore>,
        archives: Arc<dyn ArchiveStorage>,
        builder: ArchiveBuilder,
        dropbox: Dropbox,
        list_limit: i64,
    ) -> Self {
        Self {
            store,
            archives,
            builder,
            dropbox,
            list_limit,
        }
    }

    /// One page of transfers, newest first unless `before` is set.
    pub async fn list_transfers(
        &self,
        query: &ListTransfersQuery,
    ) -> Result<TransferListResponse, AppError> {
        let limit = query
            .limit
            .filter(|l| *l > 0)
            .map_or(self.list_limit, |l| l.min(self.list_limit));
        let page = TransferPage {
            limit,
            cursor: query.cursor,
            before: query.before,
        };

        let transfers = self.store.list_transfers(&page).await?;
        let next_cursor = if transfers.len() as i64 == limit {
            transfers.last().map(|t| t.pk)
        } else {
            None
        };

        Ok(TransferListResponse {
            transfers,
            next_cursor,
        })
    }

    /// Build the archive of the dropbox entry, then insert the transfer.
    ///
    /// If the insert fails the archive is removed again.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_transfer(
        &self,
        request: &CreateTransferRequest,
    ) -> Result<Transfer, AppError> {
        let input = validate_create_transfer(request)?;

        let source = match self.dropbox.resolve(&input.dropfile).await {
            Ok(Some(source)) => source,
            Ok(None) | Err(StorageError::InvalidKey(_)) => {
                return Err(AppError::field("dropfile", INVALID_DROPFILE));
            }
            Err(e) => return Err(e.into()),
        };

        let built = self.builder.build(&source).await?;

        let new_transfer = NewTransfer {
            uuid: Uuid::new_v4(),
            email: input.email,
            object: input.object,
            message: input.message,
            original_filename: input.dropfile.trim_end_matches('/').to_string(),
            archive_filename: built.filename.clone(),
            archive_size: i64::try_from(built.size).unwrap_or(i64::MAX),
            created_at: Utc::now(),
        };

        match self.store.create_transfer(new_transfer).await {
            Ok(transfer) => {
                tracing::info!(
                    transfer = %transfer.uuid,
                    archive = %transfer.archive_filename,
                    size_bytes = transfer.archive_size,
                    "Transfer created"
                );
                Ok(transfer)
            }
            Err(e) => {
                if let Err(remove_err) = self.archives.remove(&built.filename).await {
                    tracing::warn!(
                        error = %remove_err,
                        archive = %built.filename,
                        "Failed to remove archive of a transfer that was not created"
                    );
                }
                Err(e)
            }
        }
    }

    /// Transfer with its recipients
    pub async fn get_transfer(&self, id: &str) -> Result<TransferDetail, AppError> {
        let uuid = parse_id(id, TRANSFER_NOT_FOUND)?;
        let transfer = self
            .store
            .find_transfer_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::NotFound(TRANSFER_NOT_FOUND.to_string()))?;
        let recipients = self.store.list_recipients(transfer.pk).await?;

        Ok(TransferDetail {
            transfer,
            recipients,
        })
    }

    /// Change the sender email and/or the active flag.
    #[tracing::instrument(skip(self, request))]
    pub async fn update_transfer(
        &self,
        id: &str,
        request: &UpdateTransferRequest,
    ) -> Result<Transfer, AppError> {
        let uuid = parse_id(id, TRANSFER_UPDATE_NOT_FOUND)?;
        let update = validate_update_transfer(request)?;

        self.store
            .update_transfer(uuid, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(TRANSFER_UPDATE_NOT_FOUND.to_string()))
    }

    /// Remove the archive (best-effort), then the transfer and its recipients.
    #[tracing::instrument(skip(self))]
    pub async fn delete_transfer(&self, id: &str) -> Result<Transfer, AppError> {
        let uuid = parse_id(id, TRANSFER_DELETE_NOT_FOUND)?;
        let transfer = self
            .store
            .find_transfer_by_uuid(uuid)
            .await?
            .ok_or_else(|| AppError::NotFound(TRANSFER_DELETE_NOT_FOUND.to_string()))?;

        if let Err(e) = self.archives.remove(&transfer.archive_filename).await {
            tracing::warn!(
                error = %e,
                archive = %transfer.archive_filename,
                "Failed to remove archive of deleted transfer"
            );
        }

        let deleted = self
            .store
            .delete_transfer(uuid)
            .await?
            .ok_or_else(|| AppError::NotFound(TRANSFER_DELETE_NOT_FOUND.to_string()))?;

        tracing::info!(transfer = %deleted.uuid, "Transfer deleted");
        Ok(deleted)
    }

    #[tracing::instrument(skip(self, request))]
    pub async fn create_recipient(
        &self,
        request: &CreateRecipientRequest,
    ) -> Result<Recipient, AppError> {
        let input = validate_create_recipient(request)?;
        let transfer = self
            .store
            .find_transfer_by_uuid(input.transfer)
            .await?
            .ok_or_else(|| AppError::field("transfer", INVALID_TRANSFER))?;

        let recipient = self
            .store
            .create_recipient(NewRecipient {
                uuid: Uuid::new_v4(),
                email: input.email,
                transfer_pk: transfer.pk,
                active: input.active,
                created_at: Utc::now(),
            })
            .await?;

        tracing::info!(
            transfer = %transfer.uuid,
            recipient = %recipient.uuid,
            "Recipient added"
        );
        Ok(recipient)
    }

    /// Only `active` can change: the recipient was already given the link.
    #[tracing::instrument(skip(self, request))]
    pub async fn update_recipient(
        &self,
        id: &str,
        request: &UpdateRecipientRequest,
    ) -> Result<Recipient, AppError> {
        let uuid = parse_id(id, RECIPIENT_UPDATE_NOT_FOUND)?;
        let update = validate_update_recipient(request)?;

        self.store
            .update_recipient(uuid, &update)
            .await?
            .ok_or_else(|| AppError::NotFound(RECIPIENT_UPDATE_NOT_FOUND.to_string()))
    }

    pub async fn list_dropbox(&self) -> Result<Vec<DropboxEntry>, AppError> {
        Ok(self.dropbox.list().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;
    use serde_json::Value;
    use std::io::Read;

    fn request(dropfile: &str) -> CreateTransferRequest {
        CreateTransferRequest {
            email: Some("sender@example.com".into()),
            object: Some("Holiday pictures".into()),
            message: Some("Enjoy".into()),
            dropfile: Some(dropfile.into()),
        }
    }

    fn field_messages(err: &AppError) -> Vec<(String, String)> {
        err.field_errors()
            .unwrap_or_default()
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_create_transfer_archives_a_directory() {
        let fixture = Fixture::new().await;
        let album = fixture.dropbox_dir.join("holidays");
        std::fs::create_dir_all(album.join("day1")).unwrap();
        std::fs::write(album.join("day1/beach.jpg"), b"sand").unwrap();
        std::fs::write(album.join("notes.txt"), b"sun").unwrap();

        let transfer = fixture.service.create_transfer(&request("holidays/")).await.unwrap();
        assert_eq!(transfer.original_filename, "holidays");
        assert!(transfer.active);
        assert!(!transfer.complete);
        assert!(transfer.download_dates.is_empty());

        let path = fixture.transfers_dir.join(&transfer.archive_filename);
        assert_eq!(std::fs::metadata(&path).unwrap().len() as i64, transfer.archive_size);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
        let mut beach = String::new();
        archive
            .by_name("holidays/day1/beach.jpg")
            .unwrap()
            .read_to_string(&mut beach)
            .unwrap();
        assert_eq!(beach, "sand");
        assert!(archive.by_name("holidays/notes.txt").is_ok());
    }

    #[tokio::test]
    async fn test_create_transfer_rejects_unknown_dropfile() {
        let fixture = Fixture::new().await;

        for dropfile in ["missing.bin", "../etc/passwd"] {
            let err = fixture.service.create_transfer(&request(dropfile)).await.unwrap_err();
            assert_eq!(
                field_messages(&err),
                vec![("dropfile".to_string(), INVALID_DROPFILE.to_string())]
            );
        }
        assert_eq!(std::fs::read_dir(&fixture.transfers_dir).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_create_transfer_accepts_dots_inside_a_name() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("v1..2.txt").await;
        assert_eq!(transfer.original_filename, "v1..2.txt");
        assert!(fixture.transfers_dir.join(&transfer.archive_filename).is_file());
    }

    #[tokio::test]
    async fn test_create_transfer_validates_before_touching_the_dropbox() {
        let fixture = Fixture::new().await;
        let err = fixture
            .service
            .create_transfer(&CreateTransferRequest {
                email: Some("nope".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();

        let fields: Vec<String> = field_messages(&err).into_iter().map(|(f, _)| f).collect();
        assert_eq!(fields, vec!["object", "message", "dropfile", "email"]);
    }

    #[tokio::test]
    async fn test_get_transfer_includes_recipients() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("a.txt").await;
        fixture.recipient(&transfer, "zoe@example.com").await;
        fixture.recipient(&transfer, "adam@example.com").await;

        let detail = fixture.service.get_transfer(&transfer.uuid.to_string()).await.unwrap();
        assert_eq!(detail.transfer.uuid, transfer.uuid);
        let emails: Vec<&str> = detail.recipients.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["adam@example.com", "zoe@example.com"]);
    }

    #[tokio::test]
    async fn test_unknown_ids_use_operation_messages() {
        let fixture = Fixture::new().await;
        let id = Uuid::new_v4().to_string();
        let update = UpdateTransferRequest {
            email: None,
            active: Some(Value::Bool(false)),
        };

        let cases = [
            (fixture.service.get_transfer(&id).await.unwrap_err(), TRANSFER_NOT_FOUND),
            (fixture.service.get_transfer("garbage").await.unwrap_err(), TRANSFER_NOT_FOUND),
            (
                fixture.service.update_transfer(&id, &update).await.unwrap_err(),
                TRANSFER_UPDATE_NOT_FOUND,
            ),
            (fixture.service.delete_transfer(&id).await.unwrap_err(), TRANSFER_DELETE_NOT_FOUND),
            (
                fixture
                    .service
                    .update_recipient(
                        &id,
                        &UpdateRecipientRequest {
                            active: Some(Value::Bool(true)),
                        },
                    )
                    .await
                    .unwrap_err(),
                RECIPIENT_UPDATE_NOT_FOUND,
            ),
        ];

        for (err, message) in cases {
            match err {
                AppError::NotFound(msg) => assert_eq!(msg, message),
                other => panic!("expected NotFound, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_update_transfer() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("a.txt").await;

        let updated = fixture
            .service
            .update_transfer(
                &transfer.uuid.to_string(),
                &UpdateTransferRequest {
                    email: Some("new@example.com".into()),
                    active: Some(Value::Bool(false)),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.email, "new@example.com");
        assert!(!updated.active);
        assert!(updated.updated_at.is_some());

        let err = fixture
            .service
            .update_transfer(
                &transfer.uuid.to_string(),
                &UpdateTransferRequest {
                    email: None,
                    active: Some(Value::String("yes".into())),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_transfer_removes_archive_and_recipients() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("a.txt").await;
        let recipient = fixture.recipient(&transfer, "r@example.com").await;
        let archive = fixture.transfers_dir.join(&transfer.archive_filename);
        assert!(archive.exists());

        let deleted = fixture.service.delete_transfer(&transfer.uuid.to_string()).await.unwrap();
        assert_eq!(deleted.uuid, transfer.uuid);
        assert!(!archive.exists());
        assert!(fixture.store.find_transfer_by_uuid(transfer.uuid).await.unwrap().is_none());
        assert!(fixture.store.find_recipient_by_uuid(recipient.uuid).await.unwrap().is_none());
        assert!(matches!(
            fixture.pipeline.resolver().view(&recipient.uuid.to_string()).await.unwrap(),
            crate::Resolution::NotFound
        ));
    }

    #[tokio::test]
    async fn test_delete_transfer_with_missing_archive_still_deletes() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("a.txt").await;
        std::fs::remove_file(fixture.transfers_dir.join(&transfer.archive_filename)).unwrap();

        fixture.service.delete_transfer(&transfer.uuid.to_string()).await.unwrap();
        assert!(fixture.store.find_transfer_by_uuid(transfer.uuid).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_recipient() {
        let fixture = Fixture::new().await;
        let transfer = fixture.transfer("a.txt").await;

        let recipient = fixture
            .service
            .create_recipient(&CreateRecipientRequest {
                email: Some(" bob@example.com ".into()),
                transfer: Some(transfer.uuid.to_string()),
                active: Some(Value::Bool(false)),
            })
            .await
            .unwrap();
        assert_eq!(recipient.email, "bob@example.com");
        assert_eq!(recipient.transfer_pk, transfer.pk);
        assert!(!recipient.active);
        assert!(!recipient.complete);
        assert_ne!(recipient.uuid, transfer.uuid);

        let err = fixture
            .service
            .create_recipient(&CreateRecipientRequest {
                email: Some("bob@example.com".into()),
                transfer: Some(Uuid::new_v4().to_string()),
                active: None,
            })
            .await
            .unwrap_err();
        assert_eq!(
            field_messages(&err),
            vec![("transfer".to_string(), INVALID_TRANSFER.to_string())]
        );
    }

    #[tokio::test]
    async fn test_list_transfers_pages_newest_first() {
        let fixture = Fixture::new().await;
        let mut created = Vec::new();
        for name in ["1.txt", "2.txt", "3.txt", "4.txt", "5.txt"] {
            created.push(fixture.transfer(name).await.uuid);
        }

        let first = fixture
            .service
            .list_transfers(&ListTransfersQuery {
                limit: Some(2),
                cursor: None,
                before: false,
            })
            .await
            .unwrap();
        let uuids: Vec<Uuid> = first.transfers.iter().map(|t| t.uuid).collect();
        assert_eq!(uuids, vec![created[4], created[3]]);
        let cursor = first.next_cursor.unwrap();

        let second = fixture
            .service
            .list_transfers(&ListTransfersQuery {
                limit: Some(10),
                cursor: Some(cursor),
                before: false,
            })
            .await
            .unwrap();
        let uuids: Vec<Uuid> = second.transfers.iter().map(|t| t.uuid).collect();
        assert_eq!(uuids, vec![created[2], created[1], created[0]]);
        assert!(second.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_list_dropbox() {
        let fixture = Fixture::new().await;
        std::fs::write(fixture.dropbox_dir.join("b.txt"), b"b").unwrap();
        std::fs::create_dir(fixture.dropbox_dir.join("a")).unwrap();

        let entries = fixture.service.list_dropbox().await.unwrap();
        let names: Vec<(&str, bool)> = entries
            .iter()
            .map(|e| (e.name.as_str(), e.is_directory))
            .collect();
        assert_eq!(names, vec![("a", true), ("b.txt", false)]);
    }
}

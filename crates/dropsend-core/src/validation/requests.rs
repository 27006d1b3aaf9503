//! Request validation for the management API
//!
//! Each validator either returns the cleaned (trimmed) input or an `AppError::Validation`
//! carrying every field error found, so a client can fix all of them in one round trip.
//! Checks that need the store or the dropbox (existing transfer, existing dropfile) are
//! done by the services on top of these.

use uuid::Uuid;
use validator::ValidateEmail;

use crate::error::{AppError, FieldError};
use crate::models::{
    CreateRecipientRequest, CreateTransferRequest, RecipientUpdate, TransferUpdate,
    UpdateRecipientRequest, UpdateTransferRequest,
};

/// Maximum length of any e-mail address we store
pub const MAX_EMAIL_LENGTH: usize = 255;

pub const REQUIRED: &str = "This field is required";
pub const INVALID_EMAIL: &str = "Invalid email";
pub const INVALID_BOOLEAN: &str = "Invalid boolean";
pub const INVALID_VALUE: &str = "Invalid value";
pub const INVALID_TRANSFER: &str = "Invalid transfer UUID";
pub const INVALID_DROPFILE: &str = "Invalid dropfile";
pub const NOTHING_TO_UPDATE: &str = "No valid field to update";

/// Validated input for a new transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferInput {
    pub email: String,
    pub object: String,
    pub message: String,
    pub dropfile: String,
}

/// Validated input for a new recipient
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientInput {
    pub email: String,
    pub transfer: Uuid,
    pub active: bool,
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    !value.is_empty() && value.len() <= MAX_EMAIL_LENGTH && value.validate_email()
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn into_result<T>(value: T, errors: Vec<FieldError>) -> Result<T, AppError> {
    if errors.is_empty() {
        Ok(value)
    } else {
        Err(AppError::Validation(errors))
    }
}

pub fn validate_create_transfer(request: &CreateTransferRequest) -> Result<TransferInput, AppError> {
    let mut errors = Vec::new();

    let object = non_blank(&request.object);
    if object.is_none() {
        errors.push(FieldError::new("object", REQUIRED));
    }
    let message = non_blank(&request.message);
    if message.is_none() {
        errors.push(FieldError::new("message", REQUIRED));
    }
    let dropfile = non_blank(&request.dropfile);
    if dropfile.is_none() {
        errors.push(FieldError::new("dropfile", REQUIRED));
    }
    let email = non_blank(&request.email).filter(|e| is_valid_email(e));
    if email.is_none() {
        errors.push(FieldError::new("email", INVALID_EMAIL));
    }

    into_result(
        TransferInput {
            email: email.unwrap_or_default(),
            object: object.unwrap_or_default(),
            message: message.unwrap_or_default(),
            dropfile: dropfile.unwrap_or_default(),
        },
        errors,
    )
}

/// Only `email` and `active` can change once recipients have been notified.
pub fn validate_update_transfer(request: &UpdateTransferRequest) -> Result<TransferUpdate, AppError> {
    let mut errors = Vec::new();
    let mut update = TransferUpdate::default();

    if let Some(email) = &request.email {
        if is_valid_email(email) {
            update.email = Some(email.trim().to_string());
        } else {
            errors.push(FieldError::new("email", INVALID_EMAIL));
        }
    }

    match &request.active {
        None | Some(serde_json::Value::Null) => {}
        Some(serde_json::Value::Bool(active)) => update.active = Some(*active),
        Some(_) => errors.push(FieldError::new("active", INVALID_BOOLEAN)),
    }

    if errors.is_empty() && update.is_empty() {
        errors.push(FieldError::non_field(NOTHING_TO_UPDATE));
    }

    into_result(update, errors)
}

pub fn validate_create_recipient(
    request: &CreateRecipientRequest,
) -> Result<RecipientInput, AppError> {
    let mut errors = Vec::new();

    let email = non_blank(&request.email).filter(|e| is_valid_email(e));
    if email.is_none() {
        errors.push(FieldError::new("email", INVALID_EMAIL));
    }

    let transfer = request
        .transfer
        .as_deref()
        .and_then(|s| Uuid::parse_str(s.trim()).ok());
    if transfer.is_none() {
        errors.push(FieldError::new("transfer", INVALID_TRANSFER));
    }

    // Anything but an explicit boolean falls back to active.
    let active = match &request.active {
        Some(serde_json::Value::Bool(active)) => *active,
        _ => true,
    };

    into_result(
        RecipientInput {
            email: email.unwrap_or_default(),
            transfer: transfer.unwrap_or_default(),
            active,
        },
        errors,
    )
}

pub fn validate_update_recipient(
    request: &UpdateRecipientRequest,
) -> Result<RecipientUpdate, AppError> {
    match &request.active {
        Some(serde_json::Value::Bool(active)) => Ok(RecipientUpdate {
            active: Some(*active),
        }),
        _ => Err(AppError::field("active", INVALID_VALUE)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(err: AppError) -> Vec<(String, String)> {
        err.field_errors()
            .unwrap_or_default()
            .iter()
            .map(|e| (e.field.clone(), e.message.clone()))
            .collect()
    }

    #[test]
    fn test_email() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("  bob@example.org "));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("not-an-email"));
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(!is_valid_email(&long));
    }

    #[test]
    fn test_create_transfer_reports_every_field() {
        let request = CreateTransferRequest {
            email: Some("nope".into()),
            object: Some("   ".into()),
            message: None,
            dropfile: None,
        };
        let errors = messages(validate_create_transfer(&request).unwrap_err());
        assert_eq!(
            errors,
            vec![
                ("object".to_string(), REQUIRED.to_string()),
                ("message".to_string(), REQUIRED.to_string()),
                ("dropfile".to_string(), REQUIRED.to_string()),
                ("email".to_string(), INVALID_EMAIL.to_string()),
            ]
        );
    }

    #[test]
    fn test_create_transfer_trims() {
        let request = CreateTransferRequest {
            email: Some(" alice@example.com ".into()),
            object: Some(" Holidays ".into()),
            message: Some("Pictures".into()),
            dropfile: Some("photos ".into()),
        };
        let input = validate_create_transfer(&request).unwrap();
        assert_eq!(input.email, "alice@example.com");
        assert_eq!(input.object, "Holidays");
        assert_eq!(input.dropfile, "photos");
    }

    #[test]
    fn test_update_transfer() {
        let update = validate_update_transfer(&UpdateTransferRequest {
            email: None,
            active: Some(json!(false)),
        })
        .unwrap();
        assert_eq!(update.active, Some(false));
        assert!(update.email.is_none());

        let errors = messages(
            validate_update_transfer(&UpdateTransferRequest {
                email: None,
                active: Some(json!("yes")),
            })
            .unwrap_err(),
        );
        assert_eq!(errors, vec![("active".to_string(), INVALID_BOOLEAN.to_string())]);

        let errors = messages(validate_update_transfer(&UpdateTransferRequest::default()).unwrap_err());
        assert_eq!(
            errors,
            vec![("non_field_errors".to_string(), NOTHING_TO_UPDATE.to_string())]
        );
    }

    #[test]
    fn test_create_recipient() {
        let transfer = Uuid::new_v4();
        let input = validate_create_recipient(&CreateRecipientRequest {
            email: Some("carol@example.com".into()),
            transfer: Some(transfer.to_string()),
            active: Some(json!("maybe")),
        })
        .unwrap();
        assert_eq!(input.transfer, transfer);
        assert!(input.active);

        let errors = messages(
            validate_create_recipient(&CreateRecipientRequest {
                email: Some("carol@example.com".into()),
                transfer: Some("42".into()),
                active: None,
            })
            .unwrap_err(),
        );
        assert_eq!(errors, vec![("transfer".to_string(), INVALID_TRANSFER.to_string())]);
    }

    #[test]
    fn test_update_recipient_requires_boolean() {
        assert_eq!(
            validate_update_recipient(&UpdateRecipientRequest {
                active: Some(json!(false))
            })
            .unwrap(),
            RecipientUpdate {
                active: Some(false)
            }
        );
        let errors = messages(
            validate_update_recipient(&UpdateRecipientRequest {
                active: Some(json!(1)),
            })
            .unwrap_err(),
        );
        assert_eq!(errors, vec![("active".to_string(), INVALID_VALUE.to_string())]);
    }
}

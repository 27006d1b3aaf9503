//! Validation modules

pub mod requests;

pub use requests::{
    is_valid_email, validate_create_recipient, validate_create_transfer,
    validate_update_recipient, validate_update_transfer, RecipientInput, TransferInput,
    MAX_EMAIL_LENGTH,
};

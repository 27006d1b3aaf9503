//! Data models for the application
//!
//! Persisted entities (`Transfer`, `Recipient`), the write-side structs handed to the
//! store, and the request/response DTOs of the management API.

mod dropbox;
mod recipient;
mod transfer;

pub use dropbox::*;
pub use recipient::*;
pub use transfer::*;

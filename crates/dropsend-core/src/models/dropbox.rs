use serde::Serialize;
use utoipa::ToSchema;

/// A file or directory available in the dropbox
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DropboxEntry {
    pub name: String,
    pub is_directory: bool,
}

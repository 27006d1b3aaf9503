//! OpenAPI documentation, served at `/api-docs/openapi.json`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use dropsend_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Dropsend API",
        version = "0.1.0",
        description = "Archive transfers from a dropbox directory to recipients, one download link per recipient, with per-recipient and per-transfer completion tracking."
    ),
    paths(
        handlers::transfers::list_transfers,
        handlers::transfers::create_transfer,
        handlers::transfers::get_transfer,
        handlers::transfers::update_transfer,
        handlers::transfers::delete_transfer,
        handlers::recipients::create_recipient,
        handlers::recipients::update_recipient,
        handlers::dropbox::list_dropbox,
        handlers::downloads::download_page_handler,
        handlers::stream::stream_archive,
    ),
    components(schemas(
        models::Transfer,
        models::TransferDetail,
        models::TransferListResponse,
        models::CreateTransferRequest,
        models::UpdateTransferRequest,
        models::Recipient,
        models::CreateRecipientRequest,
        models::UpdateRecipientRequest,
        models::DropboxEntry,
        error::ErrorResponse,
    )),
    tags(
        (name = "transfers", description = "Sender-side transfer management"),
        (name = "recipients", description = "Recipients of a transfer"),
        (name = "dropbox", description = "Files available for new transfers"),
        (name = "downloads", description = "Public download links")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_public_and_management_paths() {
        let spec = get_openapi_spec();
        for path in [
            "/api/transfers",
            "/api/transfers/{id}",
            "/api/recipients",
            "/api/recipients/{id}",
            "/api/dropbox",
            "/downloads/{token}",
            "/stream/{token}",
        ] {
            assert!(spec.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}

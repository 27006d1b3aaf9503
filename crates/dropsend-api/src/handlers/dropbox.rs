use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use dropsend_core::models::DropboxEntry;
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/dropbox",
    tag = "dropbox",
    responses(
        (status = 200, description = "Entries at the top of the dropbox", body = Vec<DropboxEntry>),
        (status = 500, description = "Dropbox unreadable", body = ErrorResponse)
    )
)]
pub async fn list_dropbox(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    Ok(Json(state.transfers.list_dropbox().await?))
}

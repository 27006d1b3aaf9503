use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dropsend_core::models::{CreateRecipientRequest, Recipient, UpdateRecipientRequest};
use std::sync::Arc;

#[utoipa::path(
    post,
    path = "/api/recipients",
    tag = "recipients",
    request_body = CreateRecipientRequest,
    responses(
        (status = 201, description = "Recipient created", body = Recipient),
        (status = 422, description = "Invalid fields", body = ErrorResponse)
    )
)]
pub async fn create_recipient(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateRecipientRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let recipient = state.transfers.create_recipient(&request).await?;
    Ok((StatusCode::CREATED, Json(recipient)))
}

/// Only `active` can change.
#[utoipa::path(
    put,
    path = "/api/recipients/{id}",
    tag = "recipients",
    params(("id" = String, Path, description = "Recipient UUID")),
    request_body = UpdateRecipientRequest,
    responses(
        (status = 200, description = "Recipient updated", body = Recipient),
        (status = 404, description = "Recipient not found", body = ErrorResponse),
        (status = 422, description = "Invalid fields", body = ErrorResponse)
    )
)]
pub async fn update_recipient(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateRecipientRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let recipient = state.transfers.update_recipient(&id, &request).await?;
    Ok(Json(recipient))
}

use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use dropsend_core::models::{
    CreateTransferRequest, ListTransfersQuery, Transfer, TransferDetail, TransferListResponse,
    UpdateTransferRequest,
};
use std::sync::Arc;

#[utoipa::path(
    get,
    path = "/api/transfers",
    tag = "transfers",
    params(ListTransfersQuery),
    responses(
        (status = 200, description = "One page of transfers", body = TransferListResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListTransfersQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let page = state.transfers.list_transfers(&query).await?;
    Ok(Json(page))
}

#[utoipa::path(
    post,
    path = "/api/transfers",
    tag = "transfers",
    request_body = CreateTransferRequest,
    responses(
        (status = 201, description = "Transfer created", body = Transfer),
        (status = 400, description = "Malformed body", body = ErrorResponse),
        (status = 422, description = "Invalid fields", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CreateTransferRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let transfer = state.transfers.create_transfer(&request).await?;
    Ok((StatusCode::CREATED, Json(transfer)))
}

#[utoipa::path(
    get,
    path = "/api/transfers/{id}",
    tag = "transfers",
    params(("id" = String, Path, description = "Transfer UUID")),
    responses(
        (status = 200, description = "Transfer with its recipients", body = TransferDetail),
        (status = 404, description = "Transfer not found", body = ErrorResponse)
    )
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let detail = state.transfers.get_transfer(&id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    put,
    path = "/api/transfers/{id}",
    tag = "transfers",
    params(("id" = String, Path, description = "Transfer UUID")),
    request_body = UpdateTransferRequest,
    responses(
        (status = 200, description = "Transfer updated", body = Transfer),
        (status = 404, description = "Transfer not found", body = ErrorResponse),
        (status = 422, description = "Invalid fields", body = ErrorResponse)
    )
)]
pub async fn update_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateTransferRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let transfer = state.transfers.update_transfer(&id, &request).await?;
    Ok(Json(transfer))
}

#[utoipa::path(
    delete,
    path = "/api/transfers/{id}",
    tag = "transfers",
    params(("id" = String, Path, description = "Transfer UUID")),
    responses(
        (status = 200, description = "The deleted transfer", body = Transfer),
        (status = 404, description = "Transfer not found", body = ErrorResponse)
    )
)]
pub async fn delete_transfer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let transfer = state.transfers.delete_transfer(&id).await?;
    Ok(Json(transfer))
}

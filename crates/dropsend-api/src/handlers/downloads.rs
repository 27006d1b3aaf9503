//! Human-facing download page. Looking at a link never records a download.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse},
};
use dropsend_core::human_size;
use dropsend_core::models::Transfer;
use dropsend_services::download::download_filename;
use dropsend_services::Resolution;
use std::sync::Arc;

const SIZE_PRECISION: usize = 1;

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        body
    )
}

fn not_found_page() -> String {
    page(
        "Transfer not found",
        "<h1>Transfer not found</h1>\n<p>This link does not match any transfer.</p>",
    )
}

fn inaccessible_page() -> String {
    page(
        "Transfer unavailable",
        "<h1>Transfer unavailable</h1>\n<p>This transfer has been deactivated.</p>",
    )
}

fn download_page(token: &str, transfer: &Transfer) -> String {
    let body = format!(
        "<h1>{object}</h1>\n<p>{message}</p>\n<p>Sent by {email}</p>\n\
         <p><a href=\"/stream/{token}\" download>{filename}</a> ({size})</p>",
        object = escape(&transfer.object),
        message = escape(&transfer.message),
        email = escape(&transfer.email),
        token = escape(token),
        filename = escape(&download_filename(transfer)),
        size = human_size(transfer.archive_size, SIZE_PRECISION),
    );
    page(&transfer.object, &body)
}

#[utoipa::path(
    get,
    path = "/downloads/{token}",
    tag = "downloads",
    params(("token" = String, Path, description = "Recipient or transfer UUID")),
    responses(
        (status = 200, description = "Download page", body = String, content_type = "text/html"),
        (status = 404, description = "Unknown link", body = String, content_type = "text/html"),
        (status = 410, description = "Deactivated transfer or recipient", body = String, content_type = "text/html")
    )
)]
pub async fn download_page_handler(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let response = match state.downloads.resolver().view(&token).await? {
        Resolution::NotFound => (StatusCode::NOT_FOUND, Html(not_found_page())),
        Resolution::Inaccessible => (StatusCode::GONE, Html(inaccessible_page())),
        Resolution::Accessible { transfer, .. } => {
            (StatusCode::OK, Html(download_page(token.trim(), &transfer)))
        }
    };
    Ok(response)
}

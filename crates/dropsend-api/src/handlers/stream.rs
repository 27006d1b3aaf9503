use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use dropsend_core::AppError;
use dropsend_services::transfers::TRANSFER_NOT_FOUND;
use dropsend_services::{ArchiveDownload, DownloadOutcome};
use std::sync::Arc;

fn content_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{}\"", safe))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn archive_response(download: ArchiveDownload) -> Response {
    let mut response = Response::new(Body::from_stream(download.stream));
    *response.status_mut() = StatusCode::OK;

    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(download.content_type),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(download.size));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(&download.filename),
    );
    response
}

/// Stream the archive behind a recipient or transfer link, recording the download.
#[utoipa::path(
    get,
    path = "/stream/{token}",
    tag = "downloads",
    params(("token" = String, Path, description = "Recipient or transfer UUID")),
    responses(
        (status = 200, description = "Archive stream (application/zip)"),
        (status = 404, description = "Unknown or deactivated link", body = ErrorResponse),
        (status = 500, description = "Archive missing on disk", body = ErrorResponse)
    )
)]
pub async fn stream_archive(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    match state.downloads.stream(&token).await? {
        DownloadOutcome::Ready(download) => Ok(archive_response(download)),
        DownloadOutcome::NotFound => {
            Err(AppError::NotFound(TRANSFER_NOT_FOUND.to_string()).into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_is_quoted_ascii() {
        assert_eq!(
            content_disposition("report.pdf.zip"),
            "attachment; filename=\"report.pdf.zip\""
        );
        assert_eq!(
            content_disposition("we\"ird é.zip"),
            "attachment; filename=\"we_ird _.zip\""
        );
    }
}

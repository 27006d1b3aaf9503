//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post, put},
    Json, Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

pub fn setup_routes(state: Arc<AppState>) -> Router<()> {
    let api = Router::new()
        .route(
            "/transfers",
            get(handlers::transfers::list_transfers).post(handlers::transfers::create_transfer),
        )
        .route(
            "/transfers/{id}",
            get(handlers::transfers::get_transfer)
                .put(handlers::transfers::update_transfer)
                .delete(handlers::transfers::delete_transfer),
        )
        .route("/recipients", post(handlers::recipients::create_recipient))
        .route("/recipients/{id}", put(handlers::recipients::update_recipient))
        .route("/dropbox", get(handlers::dropbox::list_dropbox));

    let public = Router::new()
        .route(
            "/downloads/{token}",
            get(handlers::downloads::download_page_handler),
        )
        .route("/stream/{token}", get(handlers::stream::stream_archive))
        .route("/health", get(handlers::health::health_check));

    Router::new()
        .nest("/api", api)
        .merge(public)
        .route(
            "/api-docs/openapi.json",
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

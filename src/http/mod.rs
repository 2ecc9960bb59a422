//! JSON API plus the single-page-app hosting shim: unmatched non-API paths
//! fall back to `index.html`, responses are gzip-compressed, and every
//! request is traced.

mod admin;
mod public;

use std::path::Path;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use tower_http::{
    compression::CompressionLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use crate::{state::AppState, AppError};

/// Suffixes that mark an error as the caller's fault.
const VALIDATION_SUFFIXES: &[&str] = &[
    "/REQUIRED",
    "/INVALID",
    "/INVALID_TABLE",
    "/INVALID_COLUMN",
    "/INVALID_ORDER_BY",
    "/RATING_RANGE",
    "/DISCOUNT_RANGE",
    "/FEE_NEGATIVE",
    "/PRICE_NEGATIVE",
    "/DUPLICATE_NAME",
    "/EMPTY_PAYLOAD",
];

fn status_for(err: &AppError) -> StatusCode {
    let code = err.code();
    if code.ends_with("/NOT_FOUND") {
        return StatusCode::NOT_FOUND;
    }
    if VALIDATION_SUFFIXES.iter().any(|s| code.ends_with(s)) {
        return StatusCode::BAD_REQUEST;
    }
    StatusCode::INTERNAL_SERVER_ERROR
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(target = "permitsy", event = "request_failed", error = %self);
        }
        (status, Json(self)).into_response()
    }
}

pub fn router(state: AppState, static_dir: &Path) -> Router {
    let spa = ServeDir::new(static_dir)
        .not_found_service(ServeFile::new(static_dir.join("index.html")));

    let api = public::routes().nest("/admin", admin::routes());

    Router::new()
        .nest("/api", api)
        .with_state(state)
        .fallback_service(spa)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

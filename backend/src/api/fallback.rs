use std::path::Path;

use axum::{extract::OriginalUri, http::StatusCode};
use serde_json::{json, Value};
use tower_http::services::{ServeDir, ServeFile};

use crate::response::ApiResponse;

/// JSON 404 for anything under `/api` that no route matched.
pub async fn api_not_found(OriginalUri(uri): OriginalUri) -> ApiResponse<Value> {
    ApiResponse::new(
        StatusCode::NOT_FOUND,
        "No API route matches this path",
        json!({ "path": uri.path() }),
    )
}

/// Static assets from `dir`, falling back to `dir/index.html` so client-side
/// routes resolve to the single-page app.
pub fn spa(dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")))
}

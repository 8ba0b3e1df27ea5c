use axum::http::StatusCode;
use serde_json::Value;

use crate::response::ApiResponse;

pub async fn ping() -> ApiResponse<Value> {
    ApiResponse::message(StatusCode::OK, "Connected to Sabiflow backend")
}

//! The `{status, message, data}` envelope every JSON endpoint answers with.
//!
//! `status` is the HTTP reason phrase for the response code (`"OK"`,
//! `"Created"`, `"Unauthorized"`, ...), so clients can branch on it without
//! reading the status line.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    pub message: String,
    pub data: T,
}

pub struct ApiResponse<T> {
    code: StatusCode,
    message: String,
    data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(code: StatusCode, message: impl Into<String>, data: T) -> Self {
        Self {
            code,
            message: message.into(),
            data,
        }
    }

    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::OK, message, data)
    }

    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::new(StatusCode::CREATED, message, data)
    }
}

impl ApiResponse<Value> {
    /// Envelope with `data: null`.
    pub fn message(code: StatusCode, message: impl Into<String>) -> Self {
        Self::new(code, message, Value::Null)
    }
}

pub fn status_text(code: StatusCode) -> String {
    code.canonical_reason().unwrap_or("Unknown").to_string()
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            status: status_text(self.code),
            message: self.message,
            data: self.data,
        };
        (self.code, Json(body)).into_response()
    }
}

use std::collections::BTreeMap;

use axum::{
    extract::rejection::{FormRejection, JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{json, Value};

use crate::response::ApiResponse;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Not authenticated")]
    Unauthorized,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Not implemented")]
    NotImplemented,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(format!("Invalid request payload: {}", rejection.body_text()))
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        AppError::BadRequest(format!("Invalid form payload: {}", rejection.body_text()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, data) = match &self {
            AppError::Unauthorized | AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, self.to_string(), Value::Null)
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string(), Value::Null),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), Value::Null),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone(), Value::Null),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone(), Value::Null),
            AppError::Validation(e) => {
                let fields: BTreeMap<String, Vec<String>> = e
                    .field_errors()
                    .into_iter()
                    .map(|(field, errors)| {
                        let msgs = errors
                            .iter()
                            .map(|err| match &err.message {
                                Some(m) => m.to_string(),
                                None => err.code.to_string(),
                            })
                            .collect();
                        (field.to_string(), msgs)
                    })
                    .collect();
                (
                    StatusCode::BAD_REQUEST,
                    "Validation failed".to_string(),
                    json!(fields),
                )
            }
            AppError::NotImplemented => (StatusCode::NOT_IMPLEMENTED, self.to_string(), Value::Null),
            AppError::Database(e) => {
                // unique_violation
                if let sqlx::Error::Database(ref db_err) = e {
                    if db_err.code().as_deref() == Some("23505") {
                        tracing::warn!("Unique constraint violation: {}", db_err.message());
                        return ApiResponse::message(
                            StatusCode::CONFLICT,
                            "A record with that value already exists",
                        )
                        .into_response();
                    }
                }
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                    Value::Null,
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    Value::Null,
                )
            }
        };

        ApiResponse::new(status, message, data).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

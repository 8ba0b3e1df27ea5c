use axum::extract::State;
use serde_json::{json, Value};

use crate::{auth::AuthService, error::Result, response::ApiResponse};

/// Gated on `users:read` in the router.
pub async fn list(State(auth): State<AuthService>) -> Result<ApiResponse<Value>> {
    let users = auth.list_users().await?;
    Ok(ApiResponse::ok("Users", json!({ "users": users })))
}

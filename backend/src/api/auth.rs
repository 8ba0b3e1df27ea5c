use axum::{extract::State, http::StatusCode, Json};
use axum_extra::extract::{CookieJar, WithRejection};
use serde_json::{json, Value};
use validator::Validate;

use crate::{
    auth::{service::normalize_email, AuthService, AuthUser, SessionManager},
    error::{AppError, Result},
    models::user::{LoginRequest, RegisterRequest, User},
    response::ApiResponse,
    AppState,
};

pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(mut req), _): WithRejection<Json<RegisterRequest>, AppError>,
) -> Result<(CookieJar, ApiResponse<Value>)> {
    req.email = normalize_email(&req.email);
    req.validate()?;

    let user = state
        .auth
        .register(&req.first_name, &req.last_name, &req.email, &req.password)
        .await?;

    let jar = state.sessions.set_user_id(jar, user.id)?;

    Ok((jar, ApiResponse::created("User registered", json!({ "user": user }))))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(mut req), _): WithRejection<Json<LoginRequest>, AppError>,
) -> Result<(CookieJar, ApiResponse<Value>)> {
    req.email = normalize_email(&req.email);
    req.validate()?;

    let user = state.auth.login(&req.email, &req.password).await?;

    let jar = state.sessions.set_user_id(jar, user.id)?;

    Ok((jar, ApiResponse::ok("Logged in", json!({ "user": user }))))
}

pub async fn logout(
    State(sessions): State<SessionManager>,
    jar: CookieJar,
) -> (CookieJar, ApiResponse<Value>) {
    if let Some(user_id) = sessions.user_id(&jar) {
        tracing::info!(user_id, "User logged out");
    }
    (
        sessions.clear(jar),
        ApiResponse::message(StatusCode::OK, "Logged out successfully"),
    )
}

/// A signed cookie for a user that no longer exists is treated as no session.
pub async fn me(State(auth): State<AuthService>, user: AuthUser) -> Result<ApiResponse<User>> {
    let user = auth
        .user_by_id(user.id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(ApiResponse::ok("User details", user))
}

pub async fn permissions(
    State(auth): State<AuthService>,
    user: AuthUser,
) -> Result<ApiResponse<Value>> {
    let codes = auth.permissions_for(user.id).await?;
    Ok(ApiResponse::ok("Permissions", json!({ "permissions": codes })))
}

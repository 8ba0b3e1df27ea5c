pub mod oauth;
pub mod password;
pub mod permissions;
pub mod service;
pub mod session;

use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::extract::CookieJar;

use crate::error::AppError;

pub use permissions::{PermissionGate, Requirement};
pub use service::AuthService;
pub use session::SessionManager;

/// The signed-in user id, read from the session cookie. Rejects with 401.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: i32,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    SessionManager: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let sessions = SessionManager::from_ref(state);
        let jar = CookieJar::from_headers(&parts.headers);
        let id = sessions.user_id(&jar).ok_or(AppError::Unauthorized)?;
        Ok(AuthUser { id })
    }
}

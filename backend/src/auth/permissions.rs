//! Route gating on session validity and group permissions.
//!
//! ```ignore
//! Router::new()
//!     .route("/users", get(users::list))
//!     .route_layer(middleware::from_fn_with_state(
//!         PermissionGate::new(&state, Requirement::can("users:read")),
//!         permissions::enforce,
//!     ))
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::{
    auth::{service::AuthService, session::SessionManager},
    error::{AppError, Result},
    AppState,
};

/// A caller-declared list of permission codes plus the any-of / all-of rule.
#[derive(Debug, Clone)]
pub struct Requirement {
    codes: Arc<[String]>,
    require_all: bool,
}

impl Requirement {
    pub fn new<I, S>(codes: I, require_all: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: codes.into_iter().map(Into::into).collect(),
            require_all,
        }
    }

    pub fn can(code: impl Into<String>) -> Self {
        Self::new([code.into()], false)
    }

    pub fn any<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(codes, false)
    }

    pub fn all<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(codes, true)
    }

    pub fn codes(&self) -> &[String] {
        &self.codes
    }

    pub fn require_all(&self) -> bool {
        self.require_all
    }

    /// An empty requirement is satisfied by `all` and never by `any`.
    pub fn is_satisfied_by(&self, granted: &[String]) -> bool {
        let held = |code: &String| granted.contains(code);
        if self.require_all {
            self.codes.iter().all(held)
        } else {
            self.codes.iter().any(held)
        }
    }
}

/// State for `enforce`: what to check and how to look it up.
#[derive(Clone)]
pub struct PermissionGate {
    sessions: SessionManager,
    auth: AuthService,
    requirement: Requirement,
}

impl PermissionGate {
    pub fn new(state: &AppState, requirement: Requirement) -> Self {
        Self {
            sessions: state.sessions.clone(),
            auth: state.auth.clone(),
            requirement,
        }
    }
}

/// 401 without a session, 403 when the user's group permissions do not
/// satisfy the gate's requirement. Permissions are read fresh on every call.
pub async fn enforce(
    State(gate): State<PermissionGate>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response> {
    let user_id = gate.sessions.user_id(&jar).ok_or(AppError::Unauthorized)?;

    let granted = gate.auth.permissions_for(user_id).await?;

    if !gate.requirement.is_satisfied_by(&granted) {
        tracing::warn!(
            user_id,
            required = ?gate.requirement.codes(),
            require_all = gate.requirement.require_all(),
            "Permission check failed"
        );
        return Err(AppError::Forbidden);
    }

    Ok(next.run(request).await)
}

/// Rejects requests that carry no valid session cookie.
pub async fn require_auth(
    State(sessions): State<SessionManager>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response> {
    if sessions.user_id(&jar).is_none() {
        return Err(AppError::Unauthorized);
    }
    Ok(next.run(request).await)
}

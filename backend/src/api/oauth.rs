use axum::{
    extract::{Query, State},
    response::Redirect,
    Form,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use serde::Deserialize;

use crate::{
    auth::oauth::{generate_state, OAUTH_STATE_COOKIE, OAUTH_STATE_TTL},
    error::{AppError, Result},
    AppState,
};

const OAUTH_STATE_PATH: &str = "/api/v1/auth/google";

/// Callback parameters, from the query string on GET or a form body on POST.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

pub async fn google_login(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect)> {
    let google = state.google.as_ref().ok_or(AppError::NotImplemented)?;

    let oauth_state = generate_state();
    let url = google.authorization_url(&oauth_state)?;

    let cookie = Cookie::build((OAUTH_STATE_COOKIE, oauth_state))
        .path(OAUTH_STATE_PATH)
        .http_only(true)
        .secure(state.sessions.secure())
        .same_site(SameSite::Lax)
        .max_age(OAUTH_STATE_TTL)
        .build();

    Ok((jar.add(cookie), Redirect::temporary(&url)))
}

pub async fn google_callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<(CookieJar, Redirect)> {
    complete_google_sign_in(state, jar, query).await
}

/// `response_mode=form_post` variant of the callback.
pub async fn google_callback_form(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Form(params), _): WithRejection<Form<OAuthCallbackQuery>, AppError>,
) -> Result<(CookieJar, Redirect)> {
    complete_google_sign_in(state, jar, params).await
}

async fn complete_google_sign_in(
    state: AppState,
    jar: CookieJar,
    query: OAuthCallbackQuery,
) -> Result<(CookieJar, Redirect)> {
    let google = state.google.as_ref().ok_or(AppError::NotImplemented)?;

    if let Some(error) = query.error {
        tracing::warn!("Google OAuth returned an error: {}", error);
        return Err(AppError::BadRequest(format!("OAuth error: {}", error)));
    }

    let code = query
        .code
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing code".into()))?;

    let expected = jar.get(OAUTH_STATE_COOKIE).map(|c| c.value().to_string());
    match (expected, query.state) {
        (Some(expected), Some(got)) if expected == got => {}
        _ => return Err(AppError::BadRequest("Invalid OAuth state".into())),
    }

    let profile = google.exchange_code(&code).await?;

    let user = state
        .auth
        .find_or_create_oauth_user(&profile.name, &profile.email, profile.verified_email)
        .await?;

    let jar = jar.remove(Cookie::build(OAUTH_STATE_COOKIE).path(OAUTH_STATE_PATH));
    let jar = state.sessions.set_user_id(jar, user.id)?;

    tracing::info!(user_id = user.id, "Google sign-in completed");

    Ok((jar, Redirect::to(&state.frontend_success_redirect_url)))
}

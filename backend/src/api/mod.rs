pub mod auth;
pub mod fallback;
pub mod health;
pub mod oauth;
pub mod users;

use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::{
    auth::permissions::{self, PermissionGate, Requirement},
    AppState,
};

pub fn router(state: AppState) -> Router {
    let session_required = middleware::from_fn_with_state(
        state.sessions.clone(),
        permissions::require_auth,
    );

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        // Google OAuth2
        .route(
            "/google/login",
            get(oauth::google_login).post(oauth::google_login),
        )
        .route(
            "/google/callback",
            get(oauth::google_callback).post(oauth::google_callback_form),
        )
        .merge(
            Router::new()
                .route("/permissions", get(auth::permissions))
                .route_layer(session_required.clone()),
        );

    let user_routes = Router::new()
        .route("/users", get(users::list))
        .route_layer(middleware::from_fn_with_state(
            PermissionGate::new(&state, Requirement::can("users:read")),
            permissions::enforce,
        ))
        .route_layer(session_required);

    let v1 = Router::new()
        .route("/ping", get(health::ping))
        .nest("/auth", auth_routes)
        .merge(user_routes);

    let api = Router::new()
        .nest("/v1", v1)
        .fallback(fallback::api_not_found);

    Router::new()
        .nest("/api", api)
        .fallback_service(fallback::spa(&state.static_dir))
        .with_state(state)
}

/// Credentialed CORS for the configured frontend origins. Only the headers a
/// cookie-authenticated JSON client sends are allowed.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::ACCEPT, header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(
            origins
                .iter()
                .filter_map(|o| o.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        )
}

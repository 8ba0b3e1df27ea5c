pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod response;

use std::path::PathBuf;

use auth::{oauth::GoogleOAuthService, AuthService, SessionManager};
use config::Config;
use repository::DynUserRepository;

/// Shared application state available to all handlers via axum's State extractor.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub sessions: SessionManager,
    pub google: Option<GoogleOAuthService>,
    pub frontend_success_redirect_url: String,
    pub static_dir: PathBuf,
}

impl AppState {
    pub fn new(cfg: &Config, repo: DynUserRepository) -> Self {
        Self {
            auth: AuthService::new(repo),
            sessions: SessionManager::new(&cfg.session_key, cfg.is_production()),
            google: cfg.google.as_ref().map(GoogleOAuthService::new),
            frontend_success_redirect_url: cfg.frontend_success_redirect_url.clone(),
            static_dir: PathBuf::from(&cfg.static_dir),
        }
    }
}

impl axum::extract::FromRef<AppState> for SessionManager {
    fn from_ref(state: &AppState) -> Self {
        state.sessions.clone()
    }
}

impl axum::extract::FromRef<AppState> for AuthService {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}

#![allow(dead_code)]
use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, Response},
    Router,
};
use serde_json::Value;
use time::OffsetDateTime;
use tower::ServiceExt;

use sabiflow_backend::{
    api,
    auth::password::hash_password,
    config::Config,
    error::{AppError, Result},
    models::user::{NewUser, User},
    repository::UserRepository,
    AppState,
};

pub const SESSION_KEY: &str = "test-session-key-that-is-at-least-32-chars!!";
pub const PASSWORD: &str = "Testpass123";

/// `UserRepository` backed by a vector, with the same email-uniqueness rule
/// as the Postgres index.
#[derive(Default)]
pub struct MemoryUserRepository {
    store: Mutex<Store>,
    fail_permissions: AtomicBool,
}

#[derive(Default)]
struct Store {
    users: Vec<User>,
    group_permissions: HashMap<i32, Vec<String>>,
    next_id: i32,
}

impl Store {
    fn insert(
        &mut self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password_hash: Option<String>,
        provider: &str,
    ) -> Result<User> {
        let email = email.to_lowercase();
        if self.users.iter().any(|u| u.email == email) {
            return Err(AppError::Conflict(
                "A record with that value already exists".into(),
            ));
        }
        self.next_id += 1;
        let now = OffsetDateTime::now_utc();
        let user = User {
            id: self.next_id,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email,
            password_hash,
            provider: provider.to_string(),
            group_id: None,
            created_at: now,
            updated_at: now,
        };
        self.users.push(user.clone());
        Ok(user)
    }
}

impl MemoryUserRepository {
    /// Puts the user in a fresh group holding exactly `codes`.
    pub fn grant(&self, user_id: i32, codes: &[&str]) {
        let mut store = self.store.lock().unwrap();
        let group_id = store.group_permissions.len() as i32 + 1;
        store
            .group_permissions
            .insert(group_id, codes.iter().map(|c| c.to_string()).collect());
        if let Some(user) = store.users.iter_mut().find(|u| u.id == user_id) {
            user.group_id = Some(group_id);
        }
    }

    pub fn fail_permission_lookups(&self) {
        self.fail_permissions.store(true, Ordering::SeqCst);
    }

    pub fn user_count(&self) -> usize {
        self.store.lock().unwrap().users.len()
    }

    pub fn find(&self, email: &str) -> Option<User> {
        let store = self.store.lock().unwrap();
        store.users.iter().find(|u| u.email == email).cloned()
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User> {
        self.store.lock().unwrap().insert(
            &user.first_name,
            &user.last_name,
            &user.email,
            Some(user.password_hash),
            "local",
        )
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.to_lowercase();
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.email == email).cloned())
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_oauth_user(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
    ) -> Result<User> {
        self.store
            .lock()
            .unwrap()
            .insert(first_name, last_name, email, None, "google")
    }

    async fn get_group_permissions(&self, user_id: i32) -> Result<Vec<String>> {
        if self.fail_permissions.load(Ordering::SeqCst) {
            return Err(AppError::Internal(anyhow::anyhow!("permission store unavailable")));
        }
        let store = self.store.lock().unwrap();
        let group_id = store
            .users
            .iter()
            .find(|u| u.id == user_id)
            .and_then(|u| u.group_id);
        Ok(group_id
            .and_then(|g| store.group_permissions.get(&g).cloned())
            .unwrap_or_default())
    }

    async fn list(&self) -> Result<Vec<User>> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().rev().cloned().collect())
    }
}

pub struct TestApp {
    pub router: Router,
    pub repo: Arc<MemoryUserRepository>,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_env(&[])
    }

    pub fn with_google() -> Self {
        Self::with_env(&[
            ("GOOGLE_OAUTH_CLIENT_ID", "test-client-id"),
            ("GOOGLE_OAUTH_CLIENT_SECRET", "test-client-secret"),
            (
                "GOOGLE_OAUTH_REDIRECT_URL",
                "http://localhost:8080/api/v1/auth/google/callback",
            ),
        ])
    }

    pub fn with_env(extra: &[(&str, &str)]) -> Self {
        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgres://unused".to_string()),
            ("SESSION_KEY".to_string(), SESSION_KEY.to_string()),
        ]);
        for (k, v) in extra {
            env.insert(k.to_string(), v.to_string());
        }
        let cfg = Config::from_lookup(|key| env.get(key).cloned()).expect("test config");

        let repo = Arc::new(MemoryUserRepository::default());
        let state = AppState::new(&cfg, repo.clone());
        let router = api::router(state.clone());

        Self {
            router,
            repo,
            state,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Inserts a password account directly, bypassing the HTTP layer.
    pub fn seed_user(&self, email: &str) -> User {
        let hash = hash_password(PASSWORD).expect("hash");
        self.repo
            .store
            .lock()
            .unwrap()
            .insert("Test", "User", email, Some(hash), "local")
            .expect("seed user")
    }

    /// Logs in through the API and returns the `user_session=...` pair.
    pub async fn login(&self, email: &str) -> String {
        let resp = self
            .send(json_request(
                Method::POST,
                "/api/v1/auth/login",
                serde_json::json!({ "email": email, "password": PASSWORD }),
                None,
            ))
            .await;
        assert_eq!(resp.status(), 200, "login should succeed");
        session_cookie(&resp).expect("login sets a session cookie")
    }
}

pub fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn form_request(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn body_json(resp: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

pub fn set_cookies(resp: &Response<Body>) -> Vec<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(str::to_string)
        .collect()
}

/// The `name=value` pair of the named cookie from `Set-Cookie`, if set.
pub fn cookie_pair(resp: &Response<Body>, name: &str) -> Option<String> {
    set_cookies(resp)
        .into_iter()
        .find(|c| c.starts_with(&format!("{}=", name)))
        .map(|c| c.split(';').next().unwrap_or_default().to_string())
}

pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    cookie_pair(resp, "user_session").filter(|pair| pair != "user_session=")
}

pub fn temp_static_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("sabiflow-static-{}-{}", name, std::process::id()));
    std::fs::create_dir_all(dir.join("assets")).unwrap();
    std::fs::write(dir.join("index.html"), "<!doctype html><title>Sabiflow</title>").unwrap();
    std::fs::write(dir.join("assets/app.js"), "console.log('sabiflow');").unwrap();
    dir
}

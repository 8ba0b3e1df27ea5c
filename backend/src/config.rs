use anyhow::Context;

#[derive(Clone, Debug)]
pub struct GoogleOAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub app_env: String,
    pub listen_addr: String,
    pub database_url: String,
    pub session_key: String,
    pub google: Option<GoogleOAuthConfig>,
    pub frontend_success_redirect_url: String,
    pub cors_origins: Vec<String>,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` passes the
    /// process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let session_key = lookup("SESSION_KEY").context("SESSION_KEY must be set")?;
        if session_key.len() < 32 {
            anyhow::bail!("SESSION_KEY must be at least 32 characters for security");
        }
        if session_key.contains("change_me") {
            anyhow::bail!("SESSION_KEY contains placeholder value, set a real secret before running");
        }

        let port: u16 = var("PORT", "8080")
            .parse()
            .context("PORT must be a valid port number")?;

        // Blank values count as unset, so a copied `.env.example` keeps Google off.
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let google = match (
            non_empty("GOOGLE_OAUTH_CLIENT_ID"),
            non_empty("GOOGLE_OAUTH_CLIENT_SECRET"),
            non_empty("GOOGLE_OAUTH_REDIRECT_URL"),
        ) {
            (Some(client_id), Some(client_secret), Some(redirect_url)) => Some(GoogleOAuthConfig {
                client_id,
                client_secret,
                redirect_url,
            }),
            _ => None,
        };

        Ok(Self {
            app_env: var("APP_ENV", "development"),
            listen_addr: format!("0.0.0.0:{}", port),
            database_url: lookup("DATABASE_URL").context("DATABASE_URL must be set")?,
            session_key,
            google,
            frontend_success_redirect_url: var(
                "FRONTEND_SUCCESS_REDIRECT_URL",
                "http://localhost:5173/",
            ),
            cors_origins: var("CORS_ORIGINS", "http://localhost:5173")
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            static_dir: var("STATIC_DIR", "./static"),
        })
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    pub fn is_development(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("development")
    }
}

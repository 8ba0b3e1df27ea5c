//! Google OAuth 2.0 authorization-code flow over plain HTTPS calls.

use anyhow::Context;
use rand_core::{OsRng, RngCore};
use reqwest::Url;
use serde::Deserialize;

use crate::config::GoogleOAuthConfig;

const AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

pub const OAUTH_STATE_TTL: time::Duration = time::Duration::minutes(10);

/// Profile fields read from Google's userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleUser {
    pub email: String,
    /// Absent means unverified.
    #[serde(default)]
    pub verified_email: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Clone)]
pub struct GoogleOAuthService {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    http: reqwest::Client,
}

impl GoogleOAuthService {
    pub fn new(config: &GoogleOAuthConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            redirect_url: config.redirect_url.clone(),
            http: reqwest::Client::new(),
        }
    }

    /// Consent-screen URL carrying `state` for the callback to check.
    pub fn authorization_url(&self, state: &str) -> anyhow::Result<String> {
        let url = Url::parse_with_params(
            AUTH_URL,
            &[
                ("client_id", self.client_id.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("response_type", "code"),
                ("scope", "openid email profile"),
                ("access_type", "offline"),
                ("state", state),
            ],
        )?;
        Ok(url.into())
    }

    /// Exchanges an authorization code and fetches the signed-in profile.
    pub async fn exchange_code(&self, code: &str) -> anyhow::Result<GoogleUser> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .context("OAuth token exchange failed")?
            .error_for_status()
            .context("OAuth token endpoint returned an error")?
            .json()
            .await
            .context("Invalid OAuth token response")?;

        let user: GoogleUser = self
            .http
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .context("Google user info request failed")?
            .error_for_status()
            .context("Google user info returned an error")?
            .json()
            .await
            .context("Invalid Google user info")?;

        Ok(user)
    }
}

/// 16 random bytes, hex encoded.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 16];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

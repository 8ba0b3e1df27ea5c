//! Signed session cookie.
//!
//! The cookie value is an HS256 JWT whose `sub` is the user id. Nothing is
//! stored server-side: a valid signature and an unexpired `exp` are the whole
//! session. Missing, malformed, tampered or expired cookies all read as "no
//! session".

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

pub const SESSION_COOKIE: &str = "user_session";

pub const SESSION_TTL: time::Duration = time::Duration::days(7);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i32,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    secure: bool,
}

impl SessionManager {
    pub fn new(secret: &str, secure: bool) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            secure,
        }
    }

    /// Signs a token for `user_id` valid for `SESSION_TTL` from `now`.
    pub fn sign(&self, user_id: i32, now: OffsetDateTime) -> anyhow::Result<String> {
        let claims = SessionClaims {
            sub: user_id,
            iat: now.unix_timestamp(),
            exp: (now + SESSION_TTL).unix_timestamp(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    /// Returns the user id carried by a token, or `None` if it does not verify.
    pub fn verify(&self, token: &str) -> Option<i32> {
        match decode::<SessionClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256)) {
            Ok(data) if data.claims.sub > 0 => Some(data.claims.sub),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!("Session token rejected: {}", e);
                None
            }
        }
    }

    pub fn session_cookie(&self, user_id: i32) -> anyhow::Result<Cookie<'static>> {
        let token = self.sign(user_id, OffsetDateTime::now_utc())?;
        Ok(Cookie::build((SESSION_COOKIE, token))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Lax)
            .max_age(SESSION_TTL)
            .build())
    }

    pub fn set_user_id(&self, jar: CookieJar, user_id: i32) -> anyhow::Result<CookieJar> {
        Ok(jar.add(self.session_cookie(user_id)?))
    }

    pub fn user_id(&self, jar: &CookieJar) -> Option<i32> {
        let cookie = jar.get(SESSION_COOKIE)?;
        self.verify(cookie.value())
    }

    /// Replaces the session cookie with an expired removal cookie.
    pub fn clear(&self, jar: CookieJar) -> CookieJar {
        jar.remove(Cookie::build(SESSION_COOKIE).path("/"))
    }

    pub fn secure(&self) -> bool {
        self.secure
    }
}

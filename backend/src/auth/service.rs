use crate::{
    auth::password::{hash_password, verify_password_or_dummy},
    error::{AppError, Result},
    models::user::{NewUser, User},
    repository::DynUserRepository,
};

/// Account business rules on top of a `UserRepository`.
#[derive(Clone)]
pub struct AuthService {
    repo: DynUserRepository,
}

impl AuthService {
    pub fn new(repo: DynUserRepository) -> Self {
        Self { repo }
    }

    pub async fn register(
        &self,
        first_name: &str,
        last_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User> {
        let email = normalize_email(email);

        if self.repo.get_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict("Email already in use".into()));
        }

        let password_hash = hash_password(password)?;

        let user = self
            .repo
            .create(NewUser {
                first_name: first_name.trim().to_string(),
                last_name: last_name.trim().to_string(),
                email,
                password_hash,
            })
            .await?;

        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Unknown email, password-less account and wrong password all fail with
    /// the same `InvalidCredentials`.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let email = normalize_email(email);

        let user = self.repo.get_by_email(&email).await?;

        let stored_hash = user.as_ref().and_then(|u| u.password_hash.as_deref());
        let verified = verify_password_or_dummy(password, stored_hash);

        let Some(user) = user else {
            tracing::debug!("Login rejected: unknown email");
            return Err(AppError::InvalidCredentials);
        };

        if !verified {
            tracing::debug!(user_id = user.id, "Login rejected: bad password");
            return Err(AppError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn user_by_id(&self, id: i32) -> Result<Option<User>> {
        self.repo.get_by_id(id).await
    }

    pub async fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repo.get_by_email(&normalize_email(email)).await
    }

    /// Returns the account for `email`, creating a Google-owned one when none
    /// exists. Existing password accounts are reused as-is, so the provider
    /// must vouch for the address.
    pub async fn find_or_create_oauth_user(
        &self,
        full_name: &str,
        email: &str,
        email_verified: bool,
    ) -> Result<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            return Err(AppError::BadRequest("OAuth account has no email address".into()));
        }
        if !email_verified {
            tracing::warn!("OAuth sign-in rejected: email not verified by provider");
            return Err(AppError::BadRequest("OAuth email address is not verified".into()));
        }

        if let Some(user) = self.repo.get_by_email(&email).await? {
            return Ok(user);
        }

        let (first_name, last_name) = split_full_name(full_name, &email);
        let user = self
            .repo
            .create_oauth_user(&first_name, &last_name, &email)
            .await?;

        tracing::info!(user_id = user.id, "OAuth user created");
        Ok(user)
    }

    pub async fn permissions_for(&self, user_id: i32) -> Result<Vec<String>> {
        self.repo.get_group_permissions(user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.repo.list().await
    }
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Splits a display name on its first run of whitespace. An empty name falls
/// back to the local part of the email.
pub fn split_full_name(full_name: &str, email: &str) -> (String, String) {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        let local = email.split('@').next().unwrap_or_default();
        return (local.to_string(), String::new());
    }
    match full_name.split_once(char::is_whitespace) {
        Some((first, last)) => (first.to_string(), last.trim().to_string()),
        None => (full_name.to_string(), String::new()),
    }
}

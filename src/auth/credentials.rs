use std::sync::{Arc, OnceLock};

use uuid::Uuid;

use super::password::PasswordHasher;
use crate::db::UserRepository;
use crate::error::{Error, Result, StoreError};
use crate::models::user::{NewUser, PublicUser, User};

/// Owns user identity records.
#[derive(Clone)]
pub struct CredentialStore {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    // Verified against on unknown-email logins so both failure paths cost one Argon2 run.
    dummy_hash: Arc<OnceLock<String>>,
}

impl CredentialStore {
    pub fn new(users: Arc<dyn UserRepository>, hasher: PasswordHasher) -> Self {
        Self {
            users,
            hasher,
            dummy_hash: Arc::new(OnceLock::new()),
        }
    }

    /// Create a user unless the email is already registered.
    ///
    /// The pre-check only avoids hashing for obvious duplicates; the
    /// repository's unique constraint decides races between concurrent
    /// registrations.
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<PublicUser> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::Validation("Name is required".into()));
        }
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(Error::Validation("Password is required".into()));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::warn!(email = %email, "signup attempt with existing email");
            return Err(Error::EmailTaken);
        }

        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| Error::Internal(format!("hashing task failed: {e}")))??;

        let user = self
            .users
            .insert(NewUser {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                StoreError::UniqueViolation => Error::EmailTaken,
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "user created");
        Ok(PublicUser::from(user))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self.users.find_by_email(&email).await?)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.find_by_id(id).await?)
    }

    pub async fn verify_password(&self, user: &User, password: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let plaintext = password.to_string();
        let stored = user.password_hash.clone();
        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &stored))
            .await
            .map_err(|e| Error::Internal(format!("verification task failed: {e}")))
    }

    /// Login check. Unknown email and wrong password are the same error.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let Some(user) = self.find_by_email(email).await? else {
            self.verify_against_dummy(password).await?;
            tracing::warn!("login attempt with unknown email");
            return Err(Error::InvalidCredentials);
        };

        if !self.verify_password(&user, password).await? {
            tracing::warn!(user_id = %user.id, "invalid password attempt");
            return Err(Error::InvalidCredentials);
        }

        Ok(user)
    }

    async fn verify_against_dummy(&self, password: &str) -> Result<()> {
        let hasher = self.hasher.clone();
        let dummy = self.dummy_hash.clone();
        let plaintext = password.to_string();
        tokio::task::spawn_blocking(move || {
            let stored = match dummy.get() {
                Some(hash) => hash,
                None => {
                    let hash = hasher.hash("dummy-password-for-unknown-email")?;
                    dummy.get_or_init(|| hash)
                }
            };
            hasher.verify(&plaintext, stored);
            Ok::<(), Error>(())
        })
        .await
        .map_err(|e| Error::Internal(format!("verification task failed: {e}")))?
    }
}

/// Trim, lower-case and shape-check an email address.
pub fn normalize_email(raw: &str) -> Result<String> {
    let email = raw.trim().to_lowercase();
    let invalid = || Error::Validation("Invalid email".into());

    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
        return Err(invalid());
    }

    Ok(email)
}

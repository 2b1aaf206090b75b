//! Registration, login and token resolution on top of a [`UserStore`].

pub mod password;
pub mod store;
pub mod token;

pub use self::store::{MemoryUserStore, PgUserStore, StoreError, UserRecord, UserStore};
pub use self::token::{TokenClaims, TokenError, TokenSigner};

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("User already exists")]
    DuplicateEmail,

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate => Self::DuplicateEmail,
            StoreError::Database(err) => {
                error!("Credential store error: {err}");
                Self::Internal("credential store unavailable".to_string())
            }
        }
    }
}

/// Public identity of a user; never carries the password hash.
#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub nombres: String,
    pub apellidos: String,
}

/// Input for [`AuthService::register`].
#[derive(Clone, Default)]
pub struct Registration {
    pub nombres: String,
    pub apellidos: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("nombres", &self.nombres)
            .field("apellidos", &self.apellidos)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Normalize an email for lookup/uniqueness checks.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email))
}

fn required(value: &str, field: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::InvalidInput(format!("Missing required field: {field}")));
    }
    Ok(())
}

pub struct AuthService {
    store: Arc<dyn UserStore>,
    signer: TokenSigner,
}

impl AuthService {
    #[must_use]
    pub fn new(store: Arc<dyn UserStore>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    /// Create a user with a salted password hash.
    ///
    /// # Errors
    /// [`AuthError::InvalidInput`] for blank fields or a malformed email,
    /// [`AuthError::DuplicateEmail`] if the email is taken.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: Registration) -> Result<User, AuthError> {
        required(&registration.nombres, "nombres")?;
        required(&registration.apellidos, "apellidos")?;
        required(&registration.email, "email")?;
        required(&registration.password, "password")?;

        let email = normalize_email(&registration.email);
        if !valid_email(&email) {
            return Err(AuthError::InvalidInput("Invalid email".to_string()));
        }

        // Cheap pre-check so taken emails skip the Argon2 cost; `insert` still
        // enforces uniqueness.
        if self.store.find_by_email(&email).await?.is_some() {
            debug!("User already exists");
            return Err(AuthError::DuplicateEmail);
        }

        let password_hash = hash_blocking(registration.password).await?;

        let record = UserRecord {
            id: Uuid::new_v4(),
            email,
            password_hash,
            nombres: registration.nombres.trim().to_string(),
            apellidos: registration.apellidos.trim().to_string(),
        };
        let user = record.summary();

        self.store.insert(record).await?;

        info!(user_id = %user.id, "User registered");

        Ok(user)
    }

    /// Verify credentials and mint a session token.
    ///
    /// Unknown email and wrong password both yield [`AuthError::InvalidCredentials`].
    ///
    /// # Errors
    /// See above; [`AuthError::InvalidInput`] for blank fields.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String), AuthError> {
        required(email, "email")?;
        required(password, "password")?;

        let email = normalize_email(email);

        let Some(record) = self.store.find_by_email(&email).await? else {
            // Unknown users pay the same Argon2 cost as a wrong password.
            verify_dummy_blocking(password.to_string()).await?;
            debug!("User not found");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_blocking(record.password_hash.clone(), password.to_string()).await? {
            debug!("Password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.signer.issue(&record.email).map_err(|err| {
            error!("Error issuing session token: {err}");
            AuthError::Internal("could not issue session token".to_string())
        })?;

        info!(user_id = %record.id, "Login successful");

        Ok((record.summary(), token))
    }

    /// Resolve a session token to the user it was issued for.
    ///
    /// # Errors
    /// [`AuthError::InvalidCredentials`] for a bad token or a subject that no
    /// longer exists.
    #[instrument(skip(self, token))]
    pub async fn identify(&self, token: &str) -> Result<User, AuthError> {
        let claims = self.signer.verify(token).map_err(|err| {
            debug!("Rejected session token: {err}");
            AuthError::InvalidCredentials
        })?;

        self.store
            .find_by_email(&claims.sub)
            .await?
            .map(|record| record.summary())
            .ok_or(AuthError::InvalidCredentials)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store.kind())
            .field("signer", &self.signer)
            .finish()
    }
}

// Argon2 is CPU bound; keep it off the async workers.
async fn hash_blocking(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|err| AuthError::Internal(err.to_string()))?
        .map_err(|err| match err {
            password::PasswordError::Empty => {
                AuthError::InvalidInput("Missing required field: password".to_string())
            }
            other => AuthError::Internal(other.to_string()),
        })
}

fn dummy_hash() -> Option<&'static str> {
    static DUMMY_HASH: OnceLock<Option<String>> = OnceLock::new();
    DUMMY_HASH
        .get_or_init(|| password::hash_password("acceso-dummy-password").ok())
        .as_deref()
}

async fn verify_dummy_blocking(password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || match dummy_hash() {
        Some(hash) => password::verify_password(hash, &password).map(|_| false),
        None => Ok(false),
    })
    .await
    .map_err(|err| AuthError::Internal(err.to_string()))?
    .map_err(|err| AuthError::Internal(err.to_string()))
}

async fn verify_blocking(hash: String, password: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || password::verify_password(&hash, &password))
        .await
        .map_err(|err| AuthError::Internal(err.to_string()))?
        .map_err(|err| AuthError::Internal(err.to_string()))
}

//! Credential store: where user records live.

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::{
    collections::{hash_map::Entry, HashMap},
    time::Duration,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

use super::User;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    Duplicate,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A stored user, including the password hash.
#[derive(Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub nombres: String,
    pub apellidos: String,
}

impl UserRecord {
    /// The public view of the record.
    #[must_use]
    pub fn summary(&self) -> User {
        User {
            id: self.id,
            email: self.email.clone(),
            nombres: self.nombres.clone(),
            apellidos: self.apellidos.clone(),
        }
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"***")
            .field("nombres", &self.nombres)
            .field("apellidos", &self.apellidos)
            .finish()
    }
}

/// Storage for user records keyed by normalized email.
///
/// `insert` must be atomic with respect to the uniqueness check: a duplicate
/// email fails with [`StoreError::Duplicate`] and leaves the stored record as it was.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and the health endpoint.
    fn kind(&self) -> &'static str;
}

#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryUserStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        let mut users = self.users.write().await;
        match users.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(StoreError::Duplicate),
            Entry::Vacant(slot) => {
                slot.insert(user);
                Ok(())
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}

#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to PostgreSQL and make sure the `users` table exists.
    ///
    /// # Errors
    /// Returns an error if the connection or the schema statements fail.
    #[instrument(skip(dsn))]
    pub async fn connect(dsn: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .min_connections(1)
            .max_connections(5)
            .max_lifetime(Duration::from_secs(60 * 2))
            .test_before_acquire(true)
            .connect(dsn)
            .await?;

        let store = Self::new(pool);
        store.migrate().await?;

        Ok(store)
    }

    /// # Errors
    /// Returns an error if the schema statements fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
        debug!("users schema ready");
        Ok(())
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn insert(&self, user: UserRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, email, password, nombres, apellidos) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.nombres)
        .bind(&user.apellidos)
        .execute(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::Duplicate
            } else {
                StoreError::Database(err)
            }
        })?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(
            "SELECT id, email, password, nombres, apellidos FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(UserRecord {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("password")?,
            nombres: row.try_get("nombres")?,
            apellidos: row.try_get("apellidos")?,
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "postgresql"
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

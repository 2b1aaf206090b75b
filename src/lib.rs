//! # Acceso
//!
//! `acceso` is a small credential service. It registers users, checks their
//! passwords and hands out session tokens, and it proxies a single remote JSON
//! document for the frontend landing page.
//!
//! ## Endpoints
//!
//! - `POST /registro`: create a user from `{nombres, apellidos, email, password}`.
//! - `POST /login`: verify `{email, password}` and return `{token, user}`.
//! - `GET /session`: resolve a `Bearer` session token back to its user.
//! - `GET /`: return the `record` field of the configured remote document.
//! - `GET /health`: build information and credential store status.
//!
//! ## Credential store
//!
//! Users live in PostgreSQL when a DSN is configured, otherwise in process
//! memory. Passwords are stored as salted Argon2 hashes and emails are
//! normalized (trimmed, lowercased) before they are used as keys.
//!
//! ## Session client
//!
//! [`client::SessionClient`] is the consumer side of the contract: it posts
//! credentials, keeps the returned identity in a cookie jar scoped to `/` and
//! reports a notification plus the route to navigate to.

pub mod api;
pub mod auth;
pub mod cli;
pub mod client;
pub mod record;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

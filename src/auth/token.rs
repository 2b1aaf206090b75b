//! Signed session tokens.
//!
//! A token is `base64url(claims) "." base64url(HMAC-SHA256(claims))`. The
//! claims carry the user's email as subject, the issue time and a ULID so two
//! logins in the same second never produce the same token. Tokens are not
//! stored server side; possession of a token with a valid signature is enough.

use base64ct::{Base64UrlUnpadded, Encoding};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::SystemTime;
use thiserror::Error;
use ulid::Ulid;

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token secret cannot be empty")]
    EmptySecret,

    #[error("malformed token")]
    Malformed,

    #[error("invalid token signature")]
    Signature,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: i64,
    pub jti: String,
}

impl TokenClaims {
    #[must_use]
    pub fn new(subject: &str) -> Self {
        Self {
            sub: subject.to_string(),
            iat: now_unix_seconds(),
            jti: Ulid::new().to_string(),
        }
    }
}

pub struct TokenSigner {
    key: SecretString,
}

impl TokenSigner {
    /// # Errors
    /// Returns [`TokenError::EmptySecret`] if the secret is empty.
    pub fn new(secret: SecretString) -> Result<Self, TokenError> {
        if secret.expose_secret().is_empty() {
            return Err(TokenError::EmptySecret);
        }

        Ok(Self { key: secret })
    }

    /// Signer with a random 256-bit key; tokens die with the process.
    #[must_use]
    pub fn ephemeral() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);

        Self {
            key: SecretString::from(Base64UrlUnpadded::encode_string(&bytes)),
        }
    }

    /// Mint a token for `subject`.
    ///
    /// # Errors
    /// Returns an error if the claims cannot be encoded.
    pub fn issue(&self, subject: &str) -> Result<String, TokenError> {
        self.sign(&TokenClaims::new(subject))
    }

    /// # Errors
    /// Returns an error if the claims cannot be encoded.
    pub fn sign(&self, claims: &TokenClaims) -> Result<String, TokenError> {
        let payload = serde_json::to_vec(claims).map_err(|_| TokenError::Malformed)?;
        let payload = Base64UrlUnpadded::encode_string(&payload);
        let signature = Base64UrlUnpadded::encode_string(&self.mac(payload.as_bytes())?);

        Ok(format!("{payload}.{signature}"))
    }

    /// Check the signature and decode the claims.
    ///
    /// # Errors
    /// Returns [`TokenError::Malformed`] for anything that is not two base64url
    /// segments with JSON claims, and [`TokenError::Signature`] when the
    /// signature does not match.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        let (payload, signature) = token.trim().split_once('.').ok_or(TokenError::Malformed)?;
        let signature =
            Base64UrlUnpadded::decode_vec(signature).map_err(|_| TokenError::Malformed)?;

        let mut mac = self.hmac()?;
        mac.update(payload.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| TokenError::Signature)?;

        let payload = Base64UrlUnpadded::decode_vec(payload).map_err(|_| TokenError::Malformed)?;
        serde_json::from_slice(&payload).map_err(|_| TokenError::Malformed)
    }

    fn hmac(&self) -> Result<HmacSha256, TokenError> {
        HmacSha256::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|_| TokenError::EmptySecret)
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, TokenError> {
        let mut mac = self.hmac()?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").field("key", &"***").finish()
    }
}

fn now_unix_seconds() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

//! Remote JSON document proxied by `GET /`.
//!
//! The upstream is a JSONBin-style endpoint: it answers with
//! `{"record": ..., "metadata": ...}` and wants the access key in the
//! `X-Master-Key` header. Only the `record` field is handed back to callers.

use reqwest::{header::CONTENT_TYPE, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::APP_USER_AGENT;

pub const MASTER_KEY_HEADER: &str = "X-Master-Key";

const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream answered {0}")]
    Status(StatusCode),

    #[error("upstream document has no record field")]
    MissingRecord,
}

pub struct RecordSource {
    client: Client,
    url: Url,
    key: SecretString,
}

impl RecordSource {
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(url: Url, key: SecretString) -> Result<Self, RecordError> {
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(UPSTREAM_TIMEOUT)
            .build()?;

        Ok(Self { client, url, key })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Fetch the document and return its `record` field untouched.
    ///
    /// # Errors
    /// Any transport failure, non-2xx status, non-JSON body or missing
    /// `record` field.
    #[instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Value, RecordError> {
        let response = self
            .client
            .get(self.url.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(MASTER_KEY_HEADER, self.key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RecordError::Status(status));
        }

        let body: Value = response.json().await?;
        debug!("upstream document received");

        match body {
            Value::Object(mut document) => {
                document.remove("record").ok_or(RecordError::MissingRecord)
            }
            _ => Err(RecordError::MissingRecord),
        }
    }
}

impl std::fmt::Debug for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSource")
            .field("url", &self.url.as_str())
            .field("key", &"***")
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn debug_hides_key() {
        let source = RecordSource::new(
            Url::parse("https://api.jsonbin.io/v3/b/abc").unwrap(),
            SecretString::from("$2a$10$master".to_string()),
        )
        .unwrap();

        let rendered = format!("{source:?}");
        assert!(rendered.contains("api.jsonbin.io"));
        assert!(!rendered.contains("master"));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_request_error() {
        // Port 9 (discard) on localhost is not expected to serve HTTP.
        let source = RecordSource::new(
            Url::parse("http://127.0.0.1:9/b/abc").unwrap(),
            SecretString::from("key".to_string()),
        )
        .unwrap();

        assert!(matches!(source.fetch().await, Err(RecordError::Request(_))));
    }
}

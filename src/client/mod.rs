//! Session client for the acceso API. It submits login and registration
//! forms, keeps the returned identity in a cookie jar scoped to `/`, and turns
//! every result into a user-facing notification plus the route to open next.
//! Failures never escape as errors from the `submit_*` calls; they become error
//! notifications, the same way a browser form would show them.

pub mod cookies;

pub use self::cookies::{Cookie, CookieJar};

use crate::{
    api::handlers::{
        user_login::{LoginResponse, UserLogin},
        user_register::{RegisterResponse, UserRegister},
        ErrorBody,
    },
    APP_USER_AGENT,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, instrument};
use url::Url;

use self::cookies::{COOKIE_APELLIDOS, COOKIE_EMAIL, COOKIE_NOMBRES, COOKIE_TOKEN};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3001";
pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const LOGIN_ROUTE: &str = "/login";

const GENERIC_FALLBACK: &str = "Please try again later";

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid backend URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("request failed ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },

    #[error("response error: {0}")]
    Parse(String),
}

impl ClientError {
    /// Text shown to the user: the server's message when there is one.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Http {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            Self::Http { .. } => fallback.to_string(),
            Self::Url(_) | Self::Network(_) | Self::Parse(_) => GENERIC_FALLBACK.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub title: String,
    pub text: Option<String>,
}

impl Notification {
    fn success(title: &str) -> Self {
        Self {
            kind: NotificationKind::Success,
            title: title.to_string(),
            text: None,
        }
    }

    fn error(title: &str, text: String) -> Self {
        Self {
            kind: NotificationKind::Error,
            title: title.to_string(),
            text: Some(text),
        }
    }
}

impl fmt::Display for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "{}: {text}", self.title),
            None => write!(f, "{}", self.title),
        }
    }
}

/// What the UI should do after a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub notification: Notification,
    pub redirect: Option<String>,
}

impl Outcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.notification.kind == NotificationKind::Success
    }
}

#[derive(Debug)]
pub struct SessionClient {
    http: Client,
    base_url: Url,
    cookies: CookieJar,
}

impl SessionClient {
    /// # Errors
    /// Returns an error if the base URL is invalid or the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url = Url::parse(base_url)?;
        let http = Client::builder().user_agent(APP_USER_AGENT).build()?;

        Ok(Self {
            http,
            base_url,
            cookies: CookieJar::new(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Submit the login form. On success the identity cookies are stored and
    /// the outcome points at the dashboard. The `email` cookie keeps the
    /// address as it was typed.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn submit_login(&mut self, form: &UserLogin) -> Outcome {
        match self.login(form).await {
            Ok(response) => {
                for (name, value) in [
                    (COOKIE_EMAIL, form.email.as_str()),
                    (COOKIE_TOKEN, response.token.as_str()),
                    (COOKIE_NOMBRES, response.user.nombres.as_str()),
                    (COOKIE_APELLIDOS, response.user.apellidos.as_str()),
                ] {
                    self.cookies.set(Cookie::session(name, value));
                }

                Outcome {
                    notification: Notification::success("Login successful"),
                    redirect: Some(DASHBOARD_ROUTE.to_string()),
                }
            }
            Err(err) => {
                error!("Error: {err}");
                Outcome {
                    notification: Notification::error(
                        "Error logging in",
                        err.user_message("Error logging in"),
                    ),
                    redirect: None,
                }
            }
        }
    }

    /// Submit the registration form. On success the outcome points at the login route.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn submit_registration(&mut self, form: &UserRegister) -> Outcome {
        match self.register(form).await {
            Ok(response) => {
                debug!(user_id = %response.user.id, "registered");
                Outcome {
                    notification: Notification::success("Registration successful"),
                    redirect: Some(LOGIN_ROUTE.to_string()),
                }
            }
            Err(err) => {
                error!("Error: {err}");
                Outcome {
                    notification: Notification::error(
                        "Error registering",
                        err.user_message("Error registering"),
                    ),
                    redirect: None,
                }
            }
        }
    }

    /// `POST /login` without touching the cookie jar.
    ///
    /// # Errors
    /// Network failures, non-2xx answers and unparseable bodies.
    pub async fn login(&self, form: &UserLogin) -> Result<LoginResponse, ClientError> {
        self.post_json("login", form).await
    }

    /// `POST /registro`.
    ///
    /// # Errors
    /// Network failures, non-2xx answers and unparseable bodies.
    pub async fn register(&self, form: &UserRegister) -> Result<RegisterResponse, ClientError> {
        self.post_json("registro", form).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let url = self.endpoint(path)?;
        let response = self.http.post(url).json(body).send().await?;
        handle_json_response(response).await
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        // Keep any path prefix on the base URL: join against a trailing slash.
        let mut base = self.base_url.clone();
        if !base.path().ends_with('/') {
            let prefixed = format!("{}/", base.path());
            base.set_path(&prefixed);
        }
        Ok(base.join(path.trim_start_matches('/'))?)
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .map(|body| body.error);
        return Err(ClientError::Http {
            status: status.as_u16(),
            message,
        });
    }

    serde_json::from_slice(&body).map_err(|err| ClientError::Parse(err.to_string()))
}

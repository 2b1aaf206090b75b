use crate::{
    api::handlers::{user_login::UserLogin, user_register::UserRegister},
    client::{Outcome, SessionClient},
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use std::path::PathBuf;
use tracing::debug;

#[derive(Debug)]
pub struct LoginArgs {
    pub backend_url: String,
    pub email: String,
    pub password: SecretString,
    pub cookie_jar: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RegisterArgs {
    pub backend_url: String,
    pub email: String,
    pub password: SecretString,
    pub nombres: String,
    pub apellidos: String,
}

fn report(outcome: &Outcome) -> Result<()> {
    println!("{}", outcome.notification);

    if let Some(route) = &outcome.redirect {
        println!("Redirect: {route}");
    }

    if outcome.is_success() {
        Ok(())
    } else {
        Err(anyhow!("{}", outcome.notification.title))
    }
}

/// Sign in and optionally persist the session cookies.
/// # Errors
/// Returns an error if the backend URL is invalid, the login fails or the
/// cookie jar cannot be written.
pub async fn login(args: LoginArgs) -> Result<()> {
    let mut client = SessionClient::new(&args.backend_url)?;

    let form = UserLogin {
        email: args.email,
        password: args.password.expose_secret().to_string(),
    };

    let outcome = client.submit_login(&form).await;

    if outcome.is_success() {
        if let Some(path) = &args.cookie_jar {
            debug!(path = %path.display(), "writing cookie jar");
            tokio::fs::write(path, client.cookies().render())
                .await
                .with_context(|| format!("Failed to write cookie jar {}", path.display()))?;
        }
    }

    report(&outcome)
}

/// Create an account.
/// # Errors
/// Returns an error if the backend URL is invalid or the registration fails.
pub async fn register(args: RegisterArgs) -> Result<()> {
    let mut client = SessionClient::new(&args.backend_url)?;

    let form = UserRegister {
        nombres: args.nombres,
        apellidos: args.apellidos,
        email: args.email,
        password: args.password.expose_secret().to_string(),
    };

    let outcome = client.submit_registration(&form).await;

    report(&outcome)
}

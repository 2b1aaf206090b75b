//! The session client driving a real server bound to a loopback port.

use acceso::{
    api::{
        self,
        handlers::{user_login::UserLogin, user_register::UserRegister},
    },
    auth::{AuthService, MemoryUserStore, TokenSigner},
    client::{
        cookies::{COOKIE_APELLIDOS, COOKIE_EMAIL, COOKIE_NOMBRES, COOKIE_TOKEN},
        NotificationKind, SessionClient, DASHBOARD_ROUTE, LOGIN_ROUTE,
    },
    record::RecordSource,
};
use anyhow::Result;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::net::TcpListener;
use url::Url;

async fn spawn_server() -> Result<(String, Arc<AuthService>)> {
    let auth = Arc::new(AuthService::new(
        Arc::new(MemoryUserStore::new()),
        TokenSigner::ephemeral(),
    ));
    let records = Arc::new(RecordSource::new(
        Url::parse("http://127.0.0.1:9/b/unused")?,
        SecretString::from("unused"),
    )?);
    let app = api::router(auth.clone(), records);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((format!("http://{addr}"), auth))
}

fn ana() -> UserRegister {
    UserRegister {
        nombres: "Ana".to_string(),
        apellidos: "Pérez Núñez".to_string(),
        email: "Ana@X.com".to_string(),
        password: "secret1".to_string(),
    }
}

#[tokio::test]
async fn register_then_login_sets_cookies() -> Result<()> {
    let (base_url, auth) = spawn_server().await?;
    let mut client = SessionClient::new(&base_url)?;

    let outcome = client.submit_registration(&ana()).await;
    assert!(outcome.is_success());
    assert_eq!(outcome.notification.title, "Registration successful");
    assert_eq!(outcome.redirect.as_deref(), Some(LOGIN_ROUTE));
    assert!(client.cookies().is_empty());

    let outcome = client
        .submit_login(&UserLogin {
            email: "Ana@X.com".to_string(),
            password: "secret1".to_string(),
        })
        .await;
    assert!(outcome.is_success());
    assert_eq!(outcome.notification.title, "Login successful");
    assert_eq!(outcome.redirect.as_deref(), Some(DASHBOARD_ROUTE));

    let jar = client.cookies();
    assert_eq!(jar.len(), 4);
    assert_eq!(jar.get(COOKIE_EMAIL), Some("Ana@X.com"));
    assert_eq!(jar.get(COOKIE_NOMBRES), Some("Ana"));
    assert_eq!(jar.get(COOKIE_APELLIDOS), Some("Pérez Núñez"));
    assert!(jar.iter().all(|cookie| cookie.path == "/"));

    // the stored token is a working session token
    let token = jar.get(COOKIE_TOKEN).unwrap_or_default();
    let user = auth.identify(token).await?;
    assert_eq!(user.email, "ana@x.com");

    let rendered = jar.render();
    assert!(rendered.contains("apellidos=P%C3%A9rez%20N%C3%BA%C3%B1ez; Path=/"));

    Ok(())
}

#[tokio::test]
async fn failed_login_shows_server_message() -> Result<()> {
    let (base_url, _) = spawn_server().await?;
    let mut client = SessionClient::new(&base_url)?;
    assert!(client.submit_registration(&ana()).await.is_success());

    let outcome = client
        .submit_login(&UserLogin {
            email: "ana@x.com".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert_eq!(outcome.notification.kind, NotificationKind::Error);
    assert_eq!(outcome.notification.title, "Error logging in");
    assert_eq!(
        outcome.notification.text.as_deref(),
        Some("Invalid email or password")
    );
    assert_eq!(outcome.redirect, None);
    assert!(client.cookies().is_empty());

    Ok(())
}

#[tokio::test]
async fn duplicate_registration_shows_server_message() -> Result<()> {
    let (base_url, _) = spawn_server().await?;
    let mut client = SessionClient::new(&base_url)?;

    assert!(client.submit_registration(&ana()).await.is_success());

    let outcome = client.submit_registration(&ana()).await;
    assert!(!outcome.is_success());
    assert_eq!(outcome.notification.title, "Error registering");
    assert_eq!(
        outcome.notification.text.as_deref(),
        Some("User already exists")
    );
    assert_eq!(outcome.redirect, None);

    Ok(())
}

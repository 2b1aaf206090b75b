//! `GET /` against a local stand-in for the remote document service.

use acceso::{
    api,
    auth::{AuthService, MemoryUserStore, TokenSigner},
    record::{RecordSource, MASTER_KEY_HEADER},
};
use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    routing::get,
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

const MASTER_KEY: &str = "test-master-key";

async fn document(headers: HeaderMap) -> (StatusCode, Json<Value>) {
    let authorized = headers
        .get(MASTER_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        == Some(MASTER_KEY);

    if authorized {
        (
            StatusCode::OK,
            Json(json!({
                "record": {"items": [1, 2, 3], "title": "Bienvenidos", "nested": {"ok": true}},
                "metadata": {"id": "abc123", "private": true}
            })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid X-Master-Key"})),
        )
    }
}

async fn spawn_upstream() -> Result<SocketAddr> {
    let upstream = Router::new()
        .route("/b/doc", get(document))
        .route("/b/bare", get(|| async { Json(json!({"metadata": {}})) }))
        .route("/b/list", get(|| async { Json(json!([1, 2, 3])) }))
        .route("/b/text", get(|| async { "not json" }));

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, upstream).await;
    });
    Ok(addr)
}

fn app(url: &str, key: &str) -> Result<Router> {
    let auth = Arc::new(AuthService::new(
        Arc::new(MemoryUserStore::new()),
        TokenSigner::ephemeral(),
    ));
    let records = Arc::new(RecordSource::new(
        Url::parse(url)?,
        SecretString::from(key.to_string()),
    )?);
    Ok(api::router(auth, records))
}

async fn get_root(app: Router) -> Result<(StatusCode, Value)> {
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, serde_json::from_slice(&bytes)?))
}

#[tokio::test]
async fn returns_record_verbatim() -> Result<()> {
    let addr = spawn_upstream().await?;
    let app = app(&format!("http://{addr}/b/doc"), MASTER_KEY)?;

    let (status, body) = get_root(app).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"items": [1, 2, 3], "title": "Bienvenidos", "nested": {"ok": true}})
    );

    Ok(())
}

#[tokio::test]
async fn upstream_rejection_is_500() -> Result<()> {
    let addr = spawn_upstream().await?;
    let app = app(&format!("http://{addr}/b/doc"), "wrong-key")?;

    let (status, body) = get_root(app).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Error fetching data"}));

    Ok(())
}

#[tokio::test]
async fn malformed_documents_are_500() -> Result<()> {
    let addr = spawn_upstream().await?;

    for path in ["/b/bare", "/b/list", "/b/text", "/b/missing"] {
        let app = app(&format!("http://{addr}{path}"), MASTER_KEY)?;
        let (status, body) = get_root(app).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{path}");
        assert_eq!(body["error"], "Error fetching data", "{path}");
    }

    Ok(())
}

#[tokio::test]
async fn unreachable_upstream_is_500() -> Result<()> {
    let app = app("http://127.0.0.1:9/b/doc", MASTER_KEY)?;

    let (status, body) = get_root(app).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Error fetching data");

    Ok(())
}

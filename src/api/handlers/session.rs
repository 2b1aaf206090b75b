//! Resolve a `Bearer` session token to its user.

use crate::{
    api::handlers::{error_response, ErrorBody},
    auth::{AuthService, User},
};
use axum::{
    extract::Extension,
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct SessionResponse {
    pub user: User,
}

#[utoipa::path(
    get,
    path = "/session",
    responses(
        (status = 200, description = "Token is valid", body = SessionResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorBody)
    ),
    tag = "auth"
)]
#[instrument(skip(headers, auth))]
pub async fn session(headers: HeaderMap, auth: Extension<Arc<AuthService>>) -> impl IntoResponse {
    let Some(token) = bearer_token(&headers) else {
        return error_response(StatusCode::UNAUTHORIZED, "Missing session token");
    };

    match auth.identify(token).await {
        Ok(user) => (StatusCode::OK, Json(SessionResponse { user })).into_response(),
        Err(err) => err.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert_eq!(bearer_token(&headers), None);
    }
}

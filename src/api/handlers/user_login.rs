use crate::{
    api::handlers::{error_response, payload::Payload, ErrorBody},
    auth::{AuthService, User},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserLogin {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for UserLogin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserLogin")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

#[utoipa::path(
    post,
    path= "/login",
    request_body(content((UserLogin = "application/json"), (UserLogin = "application/x-www-form-urlencoded"))),
    responses (
        (status = 200, description = "Login successful", body = LoginResponse, content_type = "application/json"),
        (status = 400, description = "Missing email or password", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Payload<UserLogin>>,
) -> impl IntoResponse {
    let Some(Payload(user)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("user: {:?}", user);

    match auth.login(&user.email, &user.password).await {
        Ok((user, token)) => (StatusCode::OK, Json(LoginResponse { token, user })).into_response(),
        Err(err) => {
            debug!("Login rejected: {err}");
            err.into_response()
        }
    }
}

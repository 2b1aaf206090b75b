use crate::{
    api::handlers::{error_response, payload::Payload, ErrorBody},
    auth::{AuthService, Registration, User},
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};
use utoipa::ToSchema;

#[derive(ToSchema, Serialize, Deserialize, Default)]
pub struct UserRegister {
    #[serde(default)]
    pub nombres: String,
    #[serde(default)]
    pub apellidos: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for UserRegister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRegister")
            .field("nombres", &self.nombres)
            .field("apellidos", &self.apellidos)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

impl From<UserRegister> for Registration {
    fn from(payload: UserRegister) -> Self {
        Self {
            nombres: payload.nombres,
            apellidos: payload.apellidos,
            email: payload.email,
            password: payload.password,
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug)]
pub struct RegisterResponse {
    pub message: String,
    pub user: User,
}

#[utoipa::path(
    post,
    path= "/registro",
    request_body(content((UserRegister = "application/json"), (UserRegister = "application/x-www-form-urlencoded"))),
    responses (
        (status = 201, description = "Registration successful", body = RegisterResponse, content_type = "application/json"),
        (status = 400, description = "Missing fields, malformed email or email already registered", body = ErrorBody),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn register(
    auth: Extension<Arc<AuthService>>,
    payload: Option<Payload<UserRegister>>,
) -> impl IntoResponse {
    let Some(Payload(user)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Missing payload");
    };

    debug!("user: {:?}", user);

    match auth.register(user.into()).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(RegisterResponse {
                message: "User created".to_string(),
                user,
            }),
        )
            .into_response(),
        Err(err) => {
            debug!("Registration rejected: {err}");
            err.into_response()
        }
    }
}

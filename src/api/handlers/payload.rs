use axum::{
    async_trait,
    extract::{FromRequest, Request},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    Form, Json,
};
use serde::de::DeserializeOwned;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Request body accepted either as JSON or as an urlencoded form.
#[derive(Debug)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));

        if is_form {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        } else {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(value))
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Pair {
        email: String,
        password: String,
    }

    fn request(content_type: Option<&str>, body: &'static str) -> Request {
        let mut builder = Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(CONTENT_TYPE, content_type);
        }
        builder.body(Body::from(body)).unwrap()
    }

    fn expected() -> Pair {
        Pair {
            email: "ana@x.com".to_string(),
            password: "secret1".to_string(),
        }
    }

    #[tokio::test]
    async fn accepts_json() {
        let req = request(
            Some("application/json"),
            r#"{"email":"ana@x.com","password":"secret1"}"#,
        );
        let Payload(pair) = Payload::<Pair>::from_request(req, &()).await.unwrap();
        assert_eq!(pair, expected());
    }

    #[tokio::test]
    async fn accepts_urlencoded_form() {
        let req = request(
            Some("application/x-www-form-urlencoded; charset=UTF-8"),
            "email=ana%40x.com&password=secret1",
        );
        let Payload(pair) = Payload::<Pair>::from_request(req, &()).await.unwrap();
        assert_eq!(pair, expected());
    }

    #[tokio::test]
    async fn rejects_missing_content_type() {
        let req = request(None, "email=ana%40x.com&password=secret1");
        assert!(Payload::<Pair>::from_request(req, &()).await.is_err());
    }
}

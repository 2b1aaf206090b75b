use crate::{
    api::handlers::{error_response, ErrorBody},
    record::RecordSource,
};
use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{error, instrument};

#[utoipa::path(
    get,
    path= "/",
    responses (
        (status = 200, description = "The `record` field of the upstream document, verbatim", content_type = "application/json"),
        (status = 500, description = "Upstream fetch failed", body = ErrorBody),
    ),
    tag= "record"
)]
#[instrument(skip(records))]
pub async fn record(records: Extension<Arc<RecordSource>>) -> impl IntoResponse {
    match records.fetch().await {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(err) => {
            error!("Error fetching data from {}: {err}", records.url());
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Error fetching data")
        }
    }
}

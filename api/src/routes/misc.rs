use super::OkResponse;
use rocket::{get, serde::json::Json};
use rocket_okapi::openapi;

/// Liveness probe. Public; returns as soon as the server is serving
/// requests.
#[openapi(tag = "Misc")]
#[get("/health")]
pub(super) async fn health() -> Json<OkResponse> {
    Json(OkResponse::new())
}

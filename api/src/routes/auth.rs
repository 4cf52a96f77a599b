use crate::{
    error::{self, JsonResult},
    state::RocketState,
};
use rocket::{post, serde::json::Json, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, JsonSchema)]
pub(super) struct LoginRequest {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct LoginResponse {
    /// Bearer token for all protected calls; expires 24 hours after login.
    token: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum Error {
    /// Username or password missing from the request.
    MissingCredentials,
    /// Unknown username or wrong password; deliberately indistinguishable.
    InvalidCredentials,
}

/// Log in as the admin and receive a session token.
#[openapi(tag = "Auth")]
#[post("/auth/login", data = "<req>")]
pub(super) async fn login(
    state: &State<RocketState>,
    req: Json<LoginRequest>,
) -> JsonResult<LoginResponse, Error> {
    let req = req.into_inner();
    app::auth::login(
        &state.db,
        &state.token_keys,
        req.username.as_deref().unwrap_or(""),
        req.password.as_deref().unwrap_or(""),
    )
    .await
    .map(|token| Json(LoginResponse { token }))
    .map_err(|e| {
        let description = e.to_string();
        match e {
            app::auth::Error::MissingCredentials => {
                error::bad_request(Error::MissingCredentials, description)
            }
            app::auth::Error::InvalidCredentials => {
                error::unauthorized(Error::InvalidCredentials, description)
            }
        }
    })
}

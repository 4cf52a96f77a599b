use app::auth;
use okapi::openapi3::{Object, SecurityRequirement, SecurityScheme, SecuritySchemeData};
use rocket::{
    async_trait,
    http::Status,
    request::{FromRequest, Outcome},
    Request,
};
use rocket_okapi::{
    gen::OpenApiGenerator,
    request::{OpenApiFromRequest, RequestHeaderInput},
};
use thiserror::Error;

use crate::state::RocketState;

/// Request guard for all protected routes: proves the request carried a
/// valid, unexpired session token.
pub struct AdminGuard(auth::AdminGrant);

impl AdminGuard {
    pub fn grant(&self) -> &auth::AdminGrant {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("access denied")]
    AccessDenied(#[from] auth::AccessDenied),
}

const AUTH_HEADER: &str = "Authorization";
const BEARER_PREFIX: &str = "Bearer ";

#[async_trait]
impl<'r> FromRequest<'r> for AdminGuard {
    type Error = Error;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let token = req
            .headers()
            .get_one(AUTH_HEADER)
            .and_then(|header| header.strip_prefix(BEARER_PREFIX));
        match token {
            Some(token) => {
                let state = req.rocket().state::<RocketState>().unwrap();
                match auth::authorize(&state.token_keys, token) {
                    Ok(grant) => Outcome::Success(AdminGuard(grant)),
                    Err(e) => Outcome::Error((Status::Unauthorized, e.into())),
                }
            }
            None => Outcome::Error((Status::Unauthorized, auth::AccessDenied.into())),
        }
    }
}

impl<'a> OpenApiFromRequest<'a> for AdminGuard {
    fn from_request_input(
        _gen: &mut OpenApiGenerator,
        _name: String,
        _required: bool,
    ) -> rocket_okapi::Result<RequestHeaderInput> {
        Ok(openapi_auth())
    }
}

fn openapi_auth() -> RequestHeaderInput {
    const SCHEME: &str = "BearerAuth";
    let security_scheme = SecurityScheme {
        description: Some("Requires a bearer token obtained from POST /auth/login.".to_owned()),
        data: SecuritySchemeData::Http {
            scheme: "bearer".to_owned(),
            bearer_format: Some("JWT".to_owned()),
        },
        extensions: Object::default(),
    };
    let mut security_req = SecurityRequirement::new();
    security_req.insert(SCHEME.to_owned(), Vec::new());
    RequestHeaderInput::Security(SCHEME.to_owned(), security_scheme, security_req)
}

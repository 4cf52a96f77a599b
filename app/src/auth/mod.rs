use crate::{admin, database::Database};
use thiserror::Error;

mod entities;

pub use entities::{AccessDenied, AdminGrant, TokenKeys};

#[derive(Debug, Error)]
pub enum Error {
    #[error("username and password are required")]
    MissingCredentials,
    // Deliberately identical for unknown username and wrong password.
    #[error("invalid username or password")]
    InvalidCredentials,
}

/// Verifies the credentials against the stored bcrypt hash and issues a
/// signed session token. No state is kept server-side.
pub async fn login(
    db: &Database,
    keys: &TokenKeys,
    username: &str,
    password: &str,
) -> Result<String, Error> {
    if username.is_empty() || password.is_empty() {
        return Err(Error::MissingCredentials);
    }
    let admin = admin::get_by_username(db, username)
        .await
        .ok_or(Error::InvalidCredentials)?;
    if !bcrypt::verify(password, &admin.password_hash).unwrap_or(false) {
        return Err(Error::InvalidCredentials);
    }
    Ok(keys.issue(&admin))
}

/// Validates a bearer token and returns the grant encoded in it.
pub fn authorize(keys: &TokenKeys, token: &str) -> Result<AdminGrant, AccessDenied> {
    keys.verify(token)
}

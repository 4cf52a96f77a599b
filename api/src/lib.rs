//! This library contains definitions for the API layer.

use app::{auth::TokenKeys, database::Database};
use rocket::{Build, Rocket};
use state::RocketState;

mod access;
mod error;
mod routes;
mod state;

pub fn register(rocket: Rocket<Build>, db: Database, token_keys: TokenKeys) -> Rocket<Build> {
    routes::register(rocket, RocketState { db, token_keys })
}

use app::{auth::TokenKeys, database::Database};

pub struct RocketState {
    pub db: Database,
    pub token_keys: TokenKeys,
}

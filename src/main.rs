use app::auth::TokenKeys;
use app::database::{self, run_migrations};
use rocket::{launch, Build, Rocket};
use serde::Deserialize;
use url::Url;

#[derive(Debug, Deserialize)]
struct Config {
    database_url: Url,
    jwt_secret: String,
}

#[launch]
async fn rocket() -> _ {
    start_server().await
}

async fn start_server() -> Rocket<Build> {
    env_logger::init();

    let rocket = Rocket::build();
    let config: Config = rocket.figment().extract().unwrap();

    let db = database::connect(&config.database_url).await;

    run_migrations(&db).await;
    #[cfg(debug_assertions)]
    database::seed_development_data(&db).await;

    api::register(rocket, db, TokenKeys::new(&config.jwt_secret))
}

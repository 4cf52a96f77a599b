//! Provisions an admin account, creating it or resetting its password.
//!
//! Usage: create_admin <username> <password>
//! Reads the database location from the DATABASE_URL environment variable.

use anyhow::{bail, Context};
use url::Url;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (username, password) = match (args.next(), args.next()) {
        (Some(u), Some(p)) => (u, p),
        _ => bail!("usage: create_admin <username> <password>"),
    };

    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let database_url: Url = database_url.parse().context("DATABASE_URL is not a URL")?;

    let db = app::database::connect(&database_url).await;
    let id = app::admin::provision(&db, &username, &password).await;
    log::info!("admin {} provisioned with id {}", username, id.0);
    Ok(())
}

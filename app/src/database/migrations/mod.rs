//! Schema migrations, applied at startup. Each migration is a numbered
//! submodule; the `migrations` table records which serial numbers have
//! already run, so restarts are no-ops.

use super::{CountRow, Database};
use async_trait::async_trait;
use sqlx::Transaction;
use std::borrow::BorrowMut;

mod m0000_init;

#[async_trait]
pub trait Migration {
    fn serial_number(&self) -> i64;
    async fn run(&self, tx: &mut Transaction<sqlx::Postgres>);
}

/// A migration that is just an ordered list of SQL statements, executed
/// inside one transaction.
struct SqlMigration {
    serial_number: i64,
    statements: Vec<&'static str>,
}

#[async_trait]
impl Migration for SqlMigration {
    fn serial_number(&self) -> i64 {
        self.serial_number
    }

    async fn run(&self, tx: &mut Transaction<sqlx::Postgres>) {
        for statement in &self.statements {
            sqlx::query(statement).execute(tx.borrow_mut()).await.unwrap();
        }
    }
}

pub async fn run_migrations(db: &Database) {
    sqlx::query("CREATE TABLE IF NOT EXISTS migrations (serial_number bigint)")
        .execute(db)
        .await
        .unwrap();
    apply(m0000_init::migration(), db).await;
}

async fn apply(migration: impl Migration, db: &Database) {
    let applied = sqlx::query_as::<_, CountRow>(
        "SELECT COUNT(*) AS count FROM migrations WHERE serial_number = $1",
    )
    .bind(migration.serial_number())
    .fetch_one(db)
    .await
    .unwrap()
    .count
        > 0;
    if applied {
        return;
    }

    log::info!("running migration {}", migration.serial_number());

    let mut tx = db.begin().await.unwrap();
    migration.run(&mut tx).await;
    sqlx::query("INSERT INTO migrations VALUES ($1)")
        .bind(migration.serial_number())
        .execute(&mut tx)
        .await
        .unwrap();
    tx.commit().await.unwrap();
}

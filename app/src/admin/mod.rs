//! The credential store: one admin row per username, holding a salted bcrypt
//! hash. Password verification lives in [`crate::auth`].

use crate::database::Database;

mod entities;

pub use entities::{Admin, Id};

pub(crate) async fn get_by_username(db: &Database, username: &str) -> Option<Admin> {
    queries::get_by_username(db, username).await
}

/// Creates the admin, or rotates its password if the username already
/// exists. This is the out-of-band provisioning step; it is not reachable
/// through the API.
pub async fn provision(db: &Database, username: &str, password: &str) -> Id {
    let password_hash = bcrypt::hash(password, bcrypt::DEFAULT_COST).unwrap();
    queries::upsert(db, username, &password_hash).await
}

mod queries {
    use super::{Admin, Id};
    use crate::database::Database;
    use uuid::Uuid;

    pub(super) async fn get_by_username(db: &Database, username: &str) -> Option<Admin> {
        sqlx::query_as::<_, AdminRow>(
            "SELECT id, username, password_hash FROM admins WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(db)
        .await
        .unwrap()
        .map(|row| row.into_entity())
    }

    pub(super) async fn upsert(db: &Database, username: &str, password_hash: &str) -> Id {
        let row = sqlx::query_as::<_, IdRow>(
            r#"INSERT INTO admins (id, username, password_hash) VALUES ($1, $2, $3)
                ON CONFLICT (username) DO UPDATE SET password_hash = $3
                RETURNING id"#,
        )
        .bind(Uuid::new_v4())
        .bind(username)
        .bind(password_hash)
        .fetch_one(db)
        .await
        .unwrap();
        Id(row.id)
    }

    #[derive(Debug, sqlx::FromRow)]
    struct IdRow {
        id: Uuid,
    }

    #[derive(Debug, sqlx::FromRow)]
    struct AdminRow {
        id: Uuid,
        username: String,
        password_hash: String,
    }

    impl AdminRow {
        fn into_entity(self) -> Admin {
            Admin {
                id: Id(self.id),
                username: self.username,
                password_hash: self.password_hash,
            }
        }
    }
}

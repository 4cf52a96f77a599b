use super::Database;
use chrono::{NaiveDate, TimeZone, Utc};
use uuid::Uuid;

/// Seeds a development admin ("admin" / "admin123") and a couple of sample
/// invoices. Only wired up in debug builds.
pub async fn seed_development_data(db: &Database) {
    seed_admin(db).await;
    seed_invoice(
        db,
        1,
        "INV-2026-0001",
        NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
        "Aldi Putra",
        125000,
        false,
    )
    .await;
    seed_invoice(
        db,
        2,
        "INV-2026-0002",
        NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
        "Budi Santoso",
        89950,
        true,
    )
    .await;
}

async fn seed_admin(db: &Database) {
    let row = sqlx::query("SELECT id FROM admins WHERE id = $1")
        .bind(Uuid::from_u128(1))
        .fetch_optional(db)
        .await
        .unwrap();
    if row.is_some() {
        return;
    }
    sqlx::query("INSERT INTO admins (id, username, password_hash) VALUES ($1, $2, $3)")
        .bind(Uuid::from_u128(1))
        .bind("admin")
        .bind(bcrypt::hash("admin123", bcrypt::DEFAULT_COST).unwrap())
        .execute(db)
        .await
        .unwrap();
    log::info!("seeded development admin 'admin'");
}

async fn seed_invoice(
    db: &Database,
    index: u128,
    invoice_no: &str,
    date: NaiveDate,
    customer_name: &str,
    total_cents: i64,
    paid: bool,
) {
    let row = sqlx::query("SELECT id FROM invoices WHERE id = $1")
        .bind(Uuid::from_u128(index))
        .fetch_optional(db)
        .await
        .unwrap();
    if row.is_some() {
        return;
    }
    sqlx::query(
        r#"INSERT INTO invoices (id, invoice_no, date, customer_name, total_cents, status, paid_at, note)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"#,
    )
    .bind(Uuid::from_u128(index))
    .bind(invoice_no)
    .bind(date)
    .bind(customer_name)
    .bind(total_cents)
    .bind(if paid { "PAID" } else { "UNPAID" })
    .bind(paid.then(|| Utc.with_ymd_and_hms(2026, 1, 20, 9, 0, 0).unwrap()))
    .bind(Option::<String>::None)
    .execute(db)
    .await
    .unwrap();
}

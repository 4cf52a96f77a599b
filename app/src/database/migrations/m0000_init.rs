use super::{Migration, SqlMigration};

pub fn migration() -> impl Migration {
    SqlMigration {
        serial_number: 0,
        statements: vec![
            r#"
            CREATE TABLE admins (
                id UUID PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL
            )"#,
            // status is PAID or UNPAID; paid_at is set exactly when status is PAID
            r#"
            CREATE TABLE invoices (
                id UUID PRIMARY KEY,
                invoice_no TEXT UNIQUE NOT NULL,
                date DATE NOT NULL,
                customer_name TEXT NOT NULL,
                total_cents BIGINT NOT NULL,
                status TEXT NOT NULL,
                paid_at TIMESTAMP WITH TIME ZONE,
                note TEXT
            )"#,
            r#"CREATE INDEX invoice_customer_name ON invoices (customer_name)"#,
        ],
    }
}

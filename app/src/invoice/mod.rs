use crate::{database::Database, money::Cents};

mod entities;

pub use entities::{
    Changes, Error, Filter, Id, Invoice, NewInvoice, Page, PageRequest, Sort, Status, UpdateFields,
};

/// Validates the input and inserts a new invoice. A duplicate invoice number
/// is reported as [`Error::DuplicateInvoiceNo`], never silently overwritten.
pub async fn create(db: &Database, new: NewInvoice) -> Result<Invoice, Error> {
    let invoice = Invoice::create(new)?;
    queries::insert(db, &invoice).await?;
    Ok(invoice)
}

/// Applies a partial update. Only the columns present in `changes` are
/// written; transitioning the status sets or clears paid_at as a unit.
pub async fn update(db: &Database, id: Id, changes: Changes) -> Result<Invoice, Error> {
    queries::update(db, id, changes).await.ok_or(Error::NotFound)
}

/// Permanently removes an invoice. Deleting an id that no longer exists
/// fails, it does not succeed silently.
pub async fn delete(db: &Database, id: Id) -> Result<(), Error> {
    if queries::delete(db, id).await {
        Ok(())
    } else {
        Err(Error::NotFound)
    }
}

/// One page of the filtered invoice list. The metadata total reflects the
/// filter, not the page.
pub async fn list(db: &Database, filter: &Filter, request: PageRequest) -> Page<Invoice> {
    let total = queries::count(db, filter).await;
    let items = queries::list(db, filter, request).await;
    Page::new(items, total, request)
}

/// The full filtered, ordered set, ignoring pagination. Feeds the exports.
pub async fn export_set(db: &Database, filter: &Filter) -> Vec<Invoice> {
    queries::list_all(db, filter).await
}

/// Aggregate sums over the entire store, independent of any filter.
#[derive(Debug, Default, Clone, Copy)]
pub struct Totals {
    pub paid: Cents,
    pub unpaid: Cents,
    pub all: Cents,
}

pub async fn stats(db: &Database) -> Totals {
    Totals {
        paid: queries::sum_by_status(db, Some(Status::Paid)).await,
        unpaid: queries::sum_by_status(db, Some(Status::Unpaid)).await,
        all: queries::sum_by_status(db, None).await,
    }
}

/// Public verification lookup by exact invoice number.
pub async fn check(db: &Database, invoice_no: &str) -> Result<Invoice, Error> {
    let invoice_no = invoice_no.trim();
    if invoice_no.is_empty() {
        return Err(Error::MissingInvoiceNo);
    }
    queries::get_by_invoice_no(db, invoice_no)
        .await
        .ok_or(Error::NotFound)
}

mod queries {
    use super::{Changes, Error, Filter, Id, Invoice, PageRequest, Status};
    use crate::database::{CountRow, Database, SumRow};
    use crate::money::Cents;
    use chrono::{DateTime, NaiveDate, Utc};
    use const_format::formatcp;
    use uuid::Uuid;

    const COLUMNS: &str =
        "id, invoice_no, date, customer_name, total_cents, status, paid_at, note";

    /// Postgres unique_violation.
    const UNIQUE_VIOLATION: &str = "23505";

    pub(super) async fn insert(db: &Database, invoice: &Invoice) -> Result<(), Error> {
        let result = sqlx::query(formatcp!(
            "INSERT INTO invoices ({}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            COLUMNS
        ))
        .bind(invoice.id.0)
        .bind(invoice.invoice_no.clone())
        .bind(invoice.date)
        .bind(invoice.customer_name.clone())
        .bind(invoice.total.0)
        .bind(invoice.status.as_str())
        .bind(invoice.paid_at)
        .bind(invoice.note.clone())
        .execute(db)
        .await;
        match result {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(e)) if e.code().as_deref() == Some(UNIQUE_VIOLATION) => {
                Err(Error::DuplicateInvoiceNo)
            }
            Err(e) => panic!("failed to insert invoice: {}", e),
        }
    }

    pub(super) async fn update(db: &Database, id: Id, changes: Changes) -> Option<Invoice> {
        // Build the SET list dynamically so only supplied fields are
        // written. $1 is always the id.
        let paid_at = changes.paid_at();
        let mut sets = Vec::new();
        let mut bind_index = 1;
        let mut placeholder = |sets: &mut Vec<String>, column: &str| {
            bind_index += 1;
            sets.push(format!("{} = ${}", column, bind_index));
        };
        if changes.status.is_some() {
            placeholder(&mut sets, "status");
            placeholder(&mut sets, "paid_at");
        }
        if changes.note.is_some() {
            placeholder(&mut sets, "note");
        }
        if changes.customer_name.is_some() {
            placeholder(&mut sets, "customer_name");
        }
        if changes.date.is_some() {
            placeholder(&mut sets, "date");
        }
        if changes.total.is_some() {
            placeholder(&mut sets, "total_cents");
        }
        let sql = format!(
            "UPDATE invoices SET {} WHERE id = $1 RETURNING {}",
            sets.join(", "),
            COLUMNS
        );

        let mut query = sqlx::query_as::<_, InvoiceRow>(&sql).bind(id.0);
        if let Some(status) = changes.status {
            query = query.bind(status.as_str());
            query = query.bind(paid_at.flatten());
        }
        if let Some(note) = changes.note {
            query = query.bind(note);
        }
        if let Some(customer_name) = changes.customer_name {
            query = query.bind(customer_name);
        }
        if let Some(date) = changes.date {
            query = query.bind(date);
        }
        if let Some(total) = changes.total {
            query = query.bind(total.0);
        }
        query
            .fetch_optional(db)
            .await
            .unwrap()
            .map(|row| row.into_entity())
    }

    pub(super) async fn delete(db: &Database, id: Id) -> bool {
        sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(id.0)
            .execute(db)
            .await
            .unwrap()
            .rows_affected()
            > 0
    }

    pub(super) async fn count(db: &Database, filter: &Filter) -> i64 {
        let (where_sql, binds) = filter_clause(filter);
        let sql = format!("SELECT COUNT(*) AS count FROM invoices{}", where_sql);
        let mut query = sqlx::query_as::<_, CountRow>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        query.fetch_one(db).await.unwrap().count
    }

    pub(super) async fn list(
        db: &Database,
        filter: &Filter,
        request: PageRequest,
    ) -> Vec<Invoice> {
        let (where_sql, binds) = filter_clause(filter);
        let sql = format!(
            "SELECT {} FROM invoices{} ORDER BY {} LIMIT ${} OFFSET ${}",
            COLUMNS,
            where_sql,
            filter.sort.order_clause(),
            binds.len() + 1,
            binds.len() + 2,
        );
        let mut query = sqlx::query_as::<_, InvoiceRow>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        query
            .bind(request.limit)
            .bind(request.offset())
            .fetch_all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.into_entity())
            .collect()
    }

    pub(super) async fn list_all(db: &Database, filter: &Filter) -> Vec<Invoice> {
        let (where_sql, binds) = filter_clause(filter);
        let sql = format!(
            "SELECT {} FROM invoices{} ORDER BY {}",
            COLUMNS,
            where_sql,
            filter.sort.order_clause(),
        );
        let mut query = sqlx::query_as::<_, InvoiceRow>(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        query
            .fetch_all(db)
            .await
            .unwrap()
            .into_iter()
            .map(|row| row.into_entity())
            .collect()
    }

    pub(super) async fn get_by_invoice_no(db: &Database, invoice_no: &str) -> Option<Invoice> {
        sqlx::query_as::<_, InvoiceRow>(formatcp!(
            "SELECT {} FROM invoices WHERE invoice_no = $1",
            COLUMNS
        ))
        .bind(invoice_no)
        .fetch_optional(db)
        .await
        .unwrap()
        .map(|row| row.into_entity())
    }

    pub(super) async fn sum_by_status(db: &Database, status: Option<Status>) -> Cents {
        let sql = match status {
            Some(_) => "SELECT SUM(total_cents) AS sum FROM invoices WHERE status = $1",
            None => "SELECT SUM(total_cents) AS sum FROM invoices",
        };
        let mut query = sqlx::query_as::<_, SumRow<Option<i64>>>(sql);
        if let Some(status) = status {
            query = query.bind(status.as_str());
        }
        // No matching rows sums to NULL; report 0 instead.
        Cents(query.fetch_one(db).await.unwrap().sum.unwrap_or(0))
    }

    /// Returns the WHERE clause (starting with a leading space, or empty)
    /// and the bind values in placeholder order.
    fn filter_clause(filter: &Filter) -> (String, Vec<String>) {
        let mut conditions = Vec::new();
        let mut binds: Vec<String> = Vec::new();
        if let Some(search) = &filter.search {
            binds.push(format!("%{}%", escape_like(search)));
            conditions.push(format!(
                "(invoice_no LIKE ${0} ESCAPE '\\' OR customer_name LIKE ${0} ESCAPE '\\')",
                binds.len()
            ));
        }
        if let Some(status) = filter.status {
            binds.push(status.as_str().to_owned());
            conditions.push(format!("status = ${}", binds.len()));
        }
        if conditions.is_empty() {
            (String::new(), binds)
        } else {
            (format!(" WHERE {}", conditions.join(" AND ")), binds)
        }
    }

    /// The search term is a literal substring; LIKE metacharacters in it
    /// must not act as wildcards.
    fn escape_like(s: &str) -> String {
        s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
    }

    #[derive(sqlx::FromRow, Debug)]
    struct InvoiceRow {
        id: Uuid,
        invoice_no: String,
        date: NaiveDate,
        customer_name: String,
        total_cents: i64,
        status: String,
        paid_at: Option<DateTime<Utc>>,
        note: Option<String>,
    }

    impl InvoiceRow {
        fn into_entity(self) -> Invoice {
            Invoice {
                id: Id(self.id),
                invoice_no: self.invoice_no,
                date: self.date,
                customer_name: self.customer_name,
                total: Cents(self.total_cents),
                status: Status::from_column(&self.status),
                paid_at: self.paid_at,
                note: self.note,
            }
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::invoice::Sort;

        #[test]
        fn filter_clause_orders_placeholders() {
            let filter = Filter {
                search: Some("INV".to_owned()),
                status: Some(Status::Paid),
                sort: Sort::InvoiceNoAsc,
            };
            let (sql, binds) = filter_clause(&filter);
            assert_eq!(
                sql,
                " WHERE (invoice_no LIKE $1 ESCAPE '\\' OR customer_name LIKE $1 ESCAPE '\\') AND status = $2"
            );
            assert_eq!(binds, vec!["%INV%".to_owned(), "PAID".to_owned()]);
        }

        #[test]
        fn filter_clause_empty_without_criteria() {
            let (sql, binds) = filter_clause(&Filter::default());
            assert!(sql.is_empty());
            assert!(binds.is_empty());
        }

        #[test]
        fn like_metacharacters_are_escaped() {
            assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        }
    }
}

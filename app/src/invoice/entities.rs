//! Invoice entities and the validation rules of the mutation path. The
//! status/paid_at coupling is enforced here: `PAID` always carries a
//! settlement timestamp and `UNPAID` never does, no matter what the caller
//! supplies.

use crate::money::{self, Cents};
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invoiceNo, date, customerName and total are required")]
    MissingFields,
    #[error("invoiceNo is required")]
    MissingInvoiceNo,
    #[error(transparent)]
    InvalidTotal(#[from] money::ParseMoneyError),
    #[error("date is not a valid calendar date (expected YYYY-MM-DD)")]
    InvalidDate,
    #[error("status must be PAID or UNPAID")]
    InvalidStatus,
    #[error("customerName must not be empty")]
    EmptyCustomerName,
    #[error("nothing to update")]
    NothingToUpdate,
    #[error("invoice number is already in use")]
    DuplicateInvoiceNo,
    #[error("invoice not found")]
    NotFound,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Id(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Paid,
    Unpaid,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Paid => "PAID",
            Status::Unpaid => "UNPAID",
        }
    }

    /// Strict parse used by the mutation path.
    pub(crate) fn parse(s: &str) -> Result<Self, Error> {
        match s {
            "PAID" => Ok(Status::Paid),
            "UNPAID" => Ok(Status::Unpaid),
            _ => Err(Error::InvalidStatus),
        }
    }

    /// Lenient parse used by list/export filters: anything that is not a
    /// known status (including "ALL") means "no filter".
    pub fn filter(s: Option<&str>) -> Option<Self> {
        match s {
            Some("PAID") => Some(Status::Paid),
            Some("UNPAID") => Some(Status::Unpaid),
            _ => None,
        }
    }

    pub(crate) fn from_column(s: &str) -> Self {
        match Status::parse(s) {
            Ok(status) => status,
            Err(_) => panic!("invalid status {:?} in invoice row", s),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Invoice {
    pub id: Id,
    pub invoice_no: String,
    pub date: NaiveDate,
    pub customer_name: String,
    pub total: Cents,
    pub status: Status,
    pub paid_at: Option<DateTime<Utc>>,
    pub note: Option<String>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == Status::Paid
    }
}

/// Raw create input as it arrives from the API. The total is the decimal
/// form typed into the form ("12.3"), not cents.
#[derive(Debug, Default)]
pub struct NewInvoice {
    pub invoice_no: String,
    pub date: String,
    pub customer_name: String,
    pub total: String,
    pub note: Option<String>,
}

impl Invoice {
    /// Validates the create input and builds the row to insert. New invoices
    /// always start UNPAID with no settlement timestamp.
    pub(crate) fn create(new: NewInvoice) -> Result<Self, Error> {
        if new.invoice_no.is_empty()
            || new.date.is_empty()
            || new.customer_name.is_empty()
            || new.total.is_empty()
        {
            return Err(Error::MissingFields);
        }
        Ok(Self {
            id: Id(Uuid::new_v4()),
            invoice_no: new.invoice_no,
            date: parse_date(&new.date)?,
            customer_name: new.customer_name,
            total: money::parse_decimal(&new.total)?,
            status: Status::Unpaid,
            paid_at: None,
            note: new.note.filter(|note| !note.trim().is_empty()),
        })
    }
}

/// Raw partial-update input; `None` means "field not supplied".
#[derive(Debug, Default)]
pub struct UpdateFields {
    pub status: Option<String>,
    pub note: Option<String>,
    pub customer_name: Option<String>,
    pub date: Option<String>,
    pub total: Option<String>,
}

/// A validated set of column changes. Only fields present here are written,
/// so concurrent patches to different fields do not clobber each other.
#[derive(Debug, Default)]
pub struct Changes {
    pub(crate) status: Option<Status>,
    pub(crate) note: Option<Option<String>>,
    pub(crate) customer_name: Option<String>,
    pub(crate) date: Option<NaiveDate>,
    pub(crate) total: Option<Cents>,
}

impl Changes {
    pub fn parse(fields: UpdateFields) -> Result<Self, Error> {
        let mut changes = Changes::default();
        if let Some(status) = fields.status.as_deref() {
            changes.status = Some(Status::parse(status)?);
        }
        if let Some(note) = fields.note {
            // An empty (or blank) note clears the field.
            changes.note = Some(if note.trim().is_empty() { None } else { Some(note) });
        }
        if let Some(customer_name) = fields.customer_name.as_deref() {
            let trimmed = customer_name.trim();
            if trimmed.is_empty() {
                return Err(Error::EmptyCustomerName);
            }
            changes.customer_name = Some(trimmed.to_owned());
        }
        if let Some(date) = fields.date.as_deref() {
            changes.date = Some(parse_date(date)?);
        }
        if let Some(total) = fields.total.as_deref() {
            changes.total = Some(money::parse_decimal(total)?);
        }
        if changes.is_empty() {
            return Err(Error::NothingToUpdate);
        }
        Ok(changes)
    }

    fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.note.is_none()
            && self.customer_name.is_none()
            && self.date.is_none()
            && self.total.is_none()
    }

    /// The paid_at column is derived from the status transition; callers can
    /// never set it directly.
    pub(crate) fn paid_at(&self) -> Option<Option<DateTime<Utc>>> {
        self.status.map(|status| match status {
            Status::Paid => Some(Utc::now()),
            Status::Unpaid => None,
        })
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, Error> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    // Also accept the timestamp form the API itself emits.
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.naive_utc().date())
        .map_err(|_| Error::InvalidDate)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sort {
    InvoiceNoAsc,
    InvoiceNoDesc,
}

impl Sort {
    /// Unrecognized sort values fall back to ascending.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("invoiceNo_desc") => Sort::InvoiceNoDesc,
            _ => Sort::InvoiceNoAsc,
        }
    }

    pub(crate) fn order_clause(self) -> &'static str {
        match self {
            Sort::InvoiceNoAsc => "invoice_no ASC",
            Sort::InvoiceNoDesc => "invoice_no DESC",
        }
    }
}

/// Search/status/sort criteria shared by `list` and the exports. The search
/// term matches as a substring of either the invoice number or the customer
/// name.
#[derive(Debug, Default)]
pub struct Filter {
    pub search: Option<String>,
    pub status: Option<Status>,
    pub sort: Sort,
}

impl Default for Sort {
    fn default() -> Self {
        Sort::InvoiceNoAsc
    }
}

impl Filter {
    pub fn from_query(
        search: Option<String>,
        status: Option<String>,
        sort: Option<String>,
    ) -> Self {
        Self {
            search: search
                .map(|s| s.trim().to_owned())
                .filter(|s| !s.is_empty()),
            status: Status::filter(status.as_deref()),
            sort: Sort::parse(sort.as_deref()),
        }
    }
}

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub page: i64,
    pub limit: i64,
}

impl PageRequest {
    /// Page is clamped up to 1; limit is clamped into [1, 100].
    pub fn clamped(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub(crate) fn offset(self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// One page of results plus filter-wide pagination metadata.
#[derive(Debug)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub(crate) fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            limit: request.limit,
            total_pages: ((total + request.limit - 1) / request.limit).max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(new: NewInvoice) -> Result<Invoice, Error> {
        Invoice::create(new)
    }

    fn valid_new() -> NewInvoice {
        NewInvoice {
            invoice_no: "INV-0001".to_owned(),
            date: "2026-01-05".to_owned(),
            customer_name: "Aldi".to_owned(),
            total: "12.3".to_owned(),
            note: None,
        }
    }

    #[test]
    fn create_defaults_to_unpaid() {
        let invoice = create(valid_new()).unwrap();
        assert_eq!(invoice.status, Status::Unpaid);
        assert_eq!(invoice.paid_at, None);
        assert_eq!(invoice.total, Cents(1230));
    }

    #[test]
    fn create_requires_all_fields() {
        for field in ["invoice_no", "date", "customer_name", "total"] {
            let mut new = valid_new();
            match field {
                "invoice_no" => new.invoice_no.clear(),
                "date" => new.date.clear(),
                "customer_name" => new.customer_name.clear(),
                _ => new.total.clear(),
            }
            assert!(
                matches!(create(new), Err(Error::MissingFields)),
                "missing {} accepted",
                field
            );
        }
    }

    #[test]
    fn create_drops_blank_note() {
        let mut new = valid_new();
        new.note = Some("  ".to_owned());
        assert_eq!(create(new).unwrap().note, None);
    }

    #[test]
    fn create_rejects_bad_total() {
        let mut new = valid_new();
        new.total = "12.345".to_owned();
        assert!(matches!(create(new), Err(Error::InvalidTotal(_))));
    }

    #[test]
    fn create_rejects_bad_date() {
        let mut new = valid_new();
        new.date = "2026-13-41".to_owned();
        assert!(matches!(create(new), Err(Error::InvalidDate)));
    }

    #[test]
    fn status_drives_paid_at() {
        let paid = Changes::parse(UpdateFields {
            status: Some("PAID".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        assert!(paid.paid_at().unwrap().is_some());

        let unpaid = Changes::parse(UpdateFields {
            status: Some("UNPAID".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        assert_eq!(unpaid.paid_at(), Some(None));

        let untouched = Changes::parse(UpdateFields {
            note: Some("hello".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        assert_eq!(untouched.paid_at(), None);
    }

    #[test]
    fn unknown_status_is_rejected() {
        let result = Changes::parse(UpdateFields {
            status: Some("SETTLED".to_owned()),
            ..UpdateFields::default()
        });
        assert!(matches!(result, Err(Error::InvalidStatus)));
    }

    #[test]
    fn empty_patch_is_rejected() {
        assert!(matches!(
            Changes::parse(UpdateFields::default()),
            Err(Error::NothingToUpdate)
        ));
    }

    #[test]
    fn blank_note_clears_the_field() {
        let changes = Changes::parse(UpdateFields {
            note: Some("".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        assert_eq!(changes.note, Some(None));

        let changes = Changes::parse(UpdateFields {
            note: Some(" lunas cash ".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        // Non-blank notes are stored as supplied, not trimmed.
        assert_eq!(changes.note, Some(Some(" lunas cash ".to_owned())));
    }

    #[test]
    fn customer_name_is_trimmed_and_non_empty() {
        let changes = Changes::parse(UpdateFields {
            customer_name: Some("  Budi  ".to_owned()),
            ..UpdateFields::default()
        })
        .unwrap();
        assert_eq!(changes.customer_name, Some("Budi".to_owned()));

        let result = Changes::parse(UpdateFields {
            customer_name: Some("   ".to_owned()),
            ..UpdateFields::default()
        });
        assert!(matches!(result, Err(Error::EmptyCustomerName)));
    }

    #[test]
    fn filter_normalizes_leniently() {
        let filter = Filter::from_query(
            Some("  INV ".to_owned()),
            Some("ALL".to_owned()),
            Some("bogus".to_owned()),
        );
        assert_eq!(filter.search, Some("INV".to_owned()));
        assert_eq!(filter.status, None);
        assert_eq!(filter.sort, Sort::InvoiceNoAsc);

        let filter = Filter::from_query(
            Some("   ".to_owned()),
            Some("PAID".to_owned()),
            Some("invoiceNo_desc".to_owned()),
        );
        assert_eq!(filter.search, None);
        assert_eq!(filter.status, Some(Status::Paid));
        assert_eq!(filter.sort, Sort::InvoiceNoDesc);
    }

    #[test]
    fn page_request_clamps() {
        let request = PageRequest::clamped(None, None);
        assert_eq!((request.page, request.limit), (1, 10));

        let request = PageRequest::clamped(Some(-3), Some(1000));
        assert_eq!((request.page, request.limit), (1, 100));

        let request = PageRequest::clamped(Some(2), Some(0));
        assert_eq!((request.page, request.limit), (2, 1));
        assert_eq!(request.offset(), 1);
    }

    #[test]
    fn page_meta_arithmetic() {
        let page = Page::<()>::new(Vec::new(), 25, PageRequest { page: 2, limit: 10 });
        assert_eq!(page.total_pages, 3);

        let page = Page::<()>::new(Vec::new(), 0, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.total_pages, 1);

        let page = Page::<()>::new(Vec::new(), 30, PageRequest { page: 1, limit: 10 });
        assert_eq!(page.total_pages, 3);
    }
}

//! Document exports. Both renderers consume the same filtered, ordered
//! invoice set that `invoice::list` would paginate, and run entirely
//! in memory; a failure yields no partial output.

use crate::invoice::Invoice;
use crate::money::Cents;
use chrono::{DateTime, Utc};
use thiserror::Error;

mod excel;
mod pdf;

#[derive(Debug, Error)]
pub enum Error {
    #[error("spreadsheet rendering failed: {0}")]
    Excel(#[from] rust_xlsxwriter::XlsxError),
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
}

/// Renders the invoice set as an xlsx workbook.
pub fn excel(items: &[Invoice]) -> Result<Vec<u8>, Error> {
    excel::render(items)
}

/// Renders the invoice set as a paginated A4 PDF report with a summary
/// block.
pub fn pdf(items: &[Invoice], printed_at: DateTime<Utc>) -> Result<Vec<u8>, Error> {
    pdf::render(items, printed_at)
}

/// The three-line settlement summary shown on the PDF report.
#[derive(Debug, Default, Clone, Copy)]
pub struct Summary {
    pub paid: Cents,
    pub unpaid: Cents,
}

impl Summary {
    pub fn of(items: &[Invoice]) -> Self {
        let mut summary = Summary::default();
        for invoice in items {
            let bucket = if invoice.is_paid() {
                &mut summary.paid
            } else {
                &mut summary.unpaid
            };
            *bucket = bucket.checked_add(invoice.total).unwrap();
        }
        summary
    }

    pub fn grand_total(self) -> Cents {
        self.paid.checked_add(self.unpaid).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{Id, Status};
    use chrono::NaiveDate;

    fn invoice(invoice_no: &str, cents: i64, paid: bool) -> Invoice {
        Invoice {
            id: Id::default(),
            invoice_no: invoice_no.to_owned(),
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            customer_name: "Aldi Putra".to_owned(),
            total: Cents(cents),
            status: if paid { Status::Paid } else { Status::Unpaid },
            paid_at: paid.then(Utc::now),
            note: None,
        }
    }

    fn sample_set() -> Vec<Invoice> {
        vec![
            invoice("INV-0001", 1230, false),
            invoice("INV-0002", 89950, true),
            invoice("INV-0003", 10, true),
        ]
    }

    #[test]
    fn summary_sums_by_status() {
        let summary = Summary::of(&sample_set());
        assert_eq!(summary.paid, Cents(89960));
        assert_eq!(summary.unpaid, Cents(1230));
        assert_eq!(summary.grand_total(), Cents(91190));
    }

    #[test]
    fn summary_of_empty_set_is_zero() {
        let summary = Summary::of(&[]);
        assert_eq!(summary.paid, Cents(0));
        assert_eq!(summary.unpaid, Cents(0));
        assert_eq!(summary.grand_total(), Cents(0));
    }

    #[test]
    fn excel_renders_a_workbook() {
        let bytes = excel(&sample_set()).unwrap();
        // xlsx files are zip archives.
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn excel_renders_empty_set() {
        assert!(!excel(&[]).unwrap().is_empty());
    }

    #[test]
    fn pdf_renders_a_document() {
        let bytes = pdf(&sample_set(), Utc::now()).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }

    #[test]
    fn pdf_paginates_large_sets() {
        let items: Vec<Invoice> = (0..200)
            .map(|i| invoice(&format!("INV-{:04}", i), 100 + i, i % 2 == 0))
            .collect();
        let bytes = pdf(&items, Utc::now()).unwrap();
        assert_eq!(&bytes[..5], b"%PDF-");
    }
}

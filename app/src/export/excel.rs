use super::Error;
use crate::invoice::Invoice;
use rust_xlsxwriter::{Format, Workbook};

const DATE_FORMAT: &str = "%Y-%m-%d";

const COLUMNS: [(&str, f64); 7] = [
    ("Invoice No", 20.0),
    ("Date", 15.0),
    ("Customer", 25.0),
    ("Total (USD)", 14.0),
    ("Status", 10.0),
    ("Paid At", 18.0),
    ("Note", 25.0),
];

pub(super) fn render(items: &[Invoice]) -> Result<Vec<u8>, Error> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let currency = Format::new().set_num_format("$#,##0.##");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name("Invoices")?;
    for (col, (title, width)) in COLUMNS.iter().enumerate() {
        let col = col as u16;
        worksheet.set_column_width(col, *width)?;
        worksheet.write_string_with_format(0, col, *title, &header)?;
    }

    for (i, invoice) in items.iter().enumerate() {
        let row = i as u32 + 1;
        worksheet.write_string(row, 0, &invoice.invoice_no)?;
        worksheet.write_string(row, 1, invoice.date.format(DATE_FORMAT).to_string())?;
        worksheet.write_string(row, 2, &invoice.customer_name)?;
        // Display-only division; the stored amount stays integer cents.
        worksheet.write_number_with_format(row, 3, invoice.total.0 as f64 / 100.0, &currency)?;
        worksheet.write_string(row, 4, invoice.status.as_str())?;
        worksheet.write_string(
            row,
            5,
            invoice
                .paid_at
                .map(|paid_at| paid_at.format(DATE_FORMAT).to_string())
                .unwrap_or_default(),
        )?;
        worksheet.write_string(row, 6, invoice.note.as_deref().unwrap_or_default())?;
    }

    Ok(workbook.save_to_buffer()?)
}

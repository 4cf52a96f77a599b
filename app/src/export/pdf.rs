//! The paginated PDF report. Layout uses a flowing cursor in millimetres
//! from the bottom-left origin, horizontal rules between sections, and a
//! fresh page whenever the cursor reaches the bottom margin.

use super::{Error, Summary};
use crate::invoice::Invoice;
use crate::money;
use chrono::{DateTime, Utc};
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use std::io::BufWriter;

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 15.0;
const MARGIN_TOP: f32 = 15.0;
const MARGIN_BOTTOM: f32 = 15.0;

const TITLE_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 9.0;
const LINE_H: f32 = 5.0;

/// Column start offsets from the left margin, and a character budget per
/// cell (built-in fonts expose no metrics, so widths are tuned by eye).
const TABLE_COLUMNS: [(&str, f32, usize); 8] = [
    ("#", 0.0, 4),
    ("Invoice No", 10.0, 16),
    ("Date", 40.0, 11),
    ("Customer", 63.0, 24),
    ("Total", 108.0, 13),
    ("Status", 133.0, 7),
    ("Paid At", 148.0, 11),
    ("Note", 170.0, 11),
];

pub(super) fn render(items: &[Invoice], printed_at: DateTime<Utc>) -> Result<Vec<u8>, Error> {
    let (doc, first_page, first_layer) =
        PdfDocument::new("Invoice Report", Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(pdf_error)?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(pdf_error)?;

    let mut layer = doc.get_page(first_page).get_layer(first_layer);
    let mut y = PAGE_H - MARGIN_TOP;

    // Title, centered with an estimated text width.
    let title = "Invoice Report";
    let title_w = estimate_width(title, TITLE_SIZE);
    layer.use_text(
        title,
        TITLE_SIZE,
        Mm((PAGE_W - title_w) / 2.0),
        Mm(y),
        &bold,
    );
    y -= 2.0 * LINE_H;

    layer.use_text(
        format!(
            "Printed at: {}",
            printed_at.format("%Y-%m-%d %H:%M:%S UTC")
        ),
        TEXT_SIZE,
        Mm(MARGIN_X),
        Mm(y),
        &font,
    );
    y -= LINE_H;
    layer.use_text(
        format!("Invoices: {}", items.len()),
        TEXT_SIZE,
        Mm(MARGIN_X),
        Mm(y),
        &font,
    );
    y -= 1.5 * LINE_H;

    let summary = Summary::of(items);
    for (label, amount) in [
        ("Total Paid:", summary.paid),
        ("Total Unpaid:", summary.unpaid),
        ("Grand Total:", summary.grand_total()),
    ] {
        layer.use_text(label, TEXT_SIZE, Mm(MARGIN_X), Mm(y), &bold);
        layer.use_text(
            money::format_usd(amount),
            TEXT_SIZE,
            Mm(MARGIN_X + 30.0),
            Mm(y),
            &bold,
        );
        y -= LINE_H;
    }
    y -= LINE_H;

    draw_table_header(&layer, &bold, y);
    y -= LINE_H;

    for (index, invoice) in items.iter().enumerate() {
        if y < MARGIN_BOTTOM + LINE_H {
            let (page, page_layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
            layer = doc.get_page(page).get_layer(page_layer);
            y = PAGE_H - MARGIN_TOP;
            draw_table_header(&layer, &bold, y);
            y -= LINE_H;
        }
        let cells = [
            (index + 1).to_string(),
            invoice.invoice_no.clone(),
            invoice.date.format("%Y-%m-%d").to_string(),
            invoice.customer_name.clone(),
            money::format_usd(invoice.total),
            invoice.status.as_str().to_owned(),
            invoice
                .paid_at
                .map(|paid_at| paid_at.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_owned()),
            invoice.note.clone().unwrap_or_else(|| "-".to_owned()),
        ];
        for ((_, offset, budget), cell) in TABLE_COLUMNS.iter().zip(cells) {
            layer.use_text(
                truncate(&cell, *budget),
                TABLE_SIZE,
                Mm(MARGIN_X + offset),
                Mm(y),
                &font,
            );
        }
        y -= LINE_H;
    }

    let mut writer = BufWriter::new(Vec::new());
    doc.save(&mut writer).map_err(pdf_error)?;
    writer
        .into_inner()
        .map_err(|e| Error::Pdf(e.to_string()))
}

fn draw_table_header(layer: &PdfLayerReference, bold: &IndirectFontRef, y: f32) {
    for (title, offset, _) in TABLE_COLUMNS {
        layer.use_text(title, TABLE_SIZE, Mm(MARGIN_X + offset), Mm(y), bold);
    }
    draw_rule(layer, y - 1.5);
}

fn draw_rule(layer: &PdfLayerReference, y: f32) {
    layer.set_outline_thickness(0.4);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(MARGIN_X), Mm(y)), false),
            (Point::new(Mm(PAGE_W - MARGIN_X), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Helvetica has no exposed metrics; a pragmatic average advance keeps the
/// title visually centered.
fn estimate_width(text: &str, font_size: f32) -> f32 {
    text.chars().count() as f32 * font_size * 0.173
}

fn truncate(cell: &str, budget: usize) -> String {
    if cell.chars().count() <= budget {
        cell.to_owned()
    } else {
        let mut truncated: String = cell.chars().take(budget.saturating_sub(2)).collect();
        truncated.push_str("..");
        truncated
    }
}

fn pdf_error(e: printpdf::Error) -> Error {
    Error::Pdf(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_budget() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long customer name", 10), "a very l..");
    }
}

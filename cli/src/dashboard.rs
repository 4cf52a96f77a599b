//! The interactive admin view: a filtered invoice table plus a menu of
//! actions. Every mutation refetches the current page so the screen never
//! drifts from the server.

use crate::api::{ApiClient, ApiError, CreatePayload, Invoice, ListResponse, Stats, UpdatePayload};
use crate::state::ListState;
use anyhow::{bail, Context};
use comfy_table::{Attribute, Cell, Table};
use inquire::{Confirm, InquireError, Password, Select, Text};
use std::fmt;

pub fn run(mut client: ApiClient) -> anyhow::Result<()> {
    if login(&mut client)?.is_none() {
        return Ok(());
    }
    let mut state = ListState::default();

    loop {
        let (list, stats) = match fetch(&client, &state) {
            Ok(pair) => pair,
            Err(ApiError::Unauthorized) => {
                client.clear_session();
                println!("Session expired; please sign in again.");
                if login(&mut client)?.is_none() {
                    return Ok(());
                }
                continue;
            }
            Err(err) => return Err(err).context("failed to load invoices"),
        };
        // A delete can leave the current page past the end; refetch on the
        // page that still exists instead of showing an empty slice.
        if state.clamp_page(list.meta.total_pages) {
            continue;
        }
        render(&list, &stats, &state);

        let action = match prompt(Select::new("Action:", Action::MENU.to_vec()).prompt())? {
            Some(action) => action,
            None => continue,
        };
        if action == Action::Quit {
            return Ok(());
        }

        match apply(&client, &mut state, &list, action) {
            Ok(()) => {}
            Err(ActionError::Cancelled) => {}
            Err(ActionError::Api(ApiError::Unauthorized)) => {
                client.clear_session();
            }
            Err(ActionError::Api(err)) => println!("{}", err),
            Err(ActionError::Io(err)) => return Err(err),
        }
    }
}

/// Prompts for credentials until a token is issued. `None` means the admin
/// pressed Esc at the login prompt.
fn login(client: &mut ApiClient) -> anyhow::Result<Option<()>> {
    loop {
        let username = match prompt(Text::new("Username:").prompt())? {
            Some(username) => username,
            None => return Ok(None),
        };
        let password = match prompt(
            Password::new("Password:")
                .without_confirmation()
                .prompt(),
        )? {
            Some(password) => password,
            None => return Ok(None),
        };
        match client.login(&username, &password) {
            Ok(()) => return Ok(Some(())),
            Err(ApiError::Transport(err)) => return Err(err.into()),
            Err(err) => println!("{}", err),
        }
    }
}

fn fetch(client: &ApiClient, state: &ListState) -> Result<(ListResponse, Stats), ApiError> {
    let list = client.list(&state.query())?;
    let stats = client.stats()?;
    Ok((list, stats))
}

fn render(list: &ListResponse, stats: &Stats, state: &ListState) {
    println!();
    println!(
        "Paid {}   Unpaid {}   All {}",
        format_cents(stats.total_paid_cents),
        format_cents(stats.total_unpaid_cents),
        format_cents(stats.total_all_cents),
    );

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Invoice No").add_attribute(Attribute::Bold),
        Cell::new("Date").add_attribute(Attribute::Bold),
        Cell::new("Customer").add_attribute(Attribute::Bold),
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new("Status").add_attribute(Attribute::Bold),
        Cell::new("Paid At").add_attribute(Attribute::Bold),
        Cell::new("Note").add_attribute(Attribute::Bold),
    ]);
    for invoice in &list.items {
        table.add_row(vec![
            invoice.invoice_no.clone(),
            invoice.date.clone(),
            invoice.customer_name.clone(),
            format_cents(invoice.total_cents),
            invoice.status.clone(),
            invoice.paid_at.clone().unwrap_or_default(),
            invoice.note.clone().unwrap_or_default(),
        ]);
    }
    println!("{table}");

    let mut filters = vec![format!("sort {}", state.sort_token())];
    if !state.search.trim().is_empty() {
        filters.push(format!("search \"{}\"", state.search.trim()));
    }
    if let Some(status) = state.status {
        filters.push(format!("status {}", status));
    }
    println!(
        "Page {}/{}   {} invoices   [{}]",
        list.meta.page,
        list.meta.total_pages,
        list.meta.total,
        filters.join(", "),
    );
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    FilterStatus,
    ToggleSort,
    NextPage,
    PrevPage,
    SetLimit,
    Create,
    Edit,
    TogglePaid,
    Delete,
    ExportExcel,
    ExportPdf,
    Refresh,
    Quit,
}

impl Action {
    const MENU: &'static [Action] = &[
        Action::Search,
        Action::FilterStatus,
        Action::ToggleSort,
        Action::NextPage,
        Action::PrevPage,
        Action::SetLimit,
        Action::Create,
        Action::Edit,
        Action::TogglePaid,
        Action::Delete,
        Action::ExportExcel,
        Action::ExportPdf,
        Action::Refresh,
        Action::Quit,
    ];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Search => "Search",
            Action::FilterStatus => "Filter by status",
            Action::ToggleSort => "Toggle sort direction",
            Action::NextPage => "Next page",
            Action::PrevPage => "Previous page",
            Action::SetLimit => "Rows per page",
            Action::Create => "New invoice",
            Action::Edit => "Edit invoice",
            Action::TogglePaid => "Mark paid / unpaid",
            Action::Delete => "Delete invoice",
            Action::ExportExcel => "Export Excel",
            Action::ExportPdf => "Export PDF",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        };
        f.write_str(label)
    }
}

enum ActionError {
    /// The admin pressed Esc mid-flow; nothing was sent.
    Cancelled,
    Api(ApiError),
    Io(anyhow::Error),
}

impl From<ApiError> for ActionError {
    fn from(err: ApiError) -> Self {
        ActionError::Api(err)
    }
}

fn apply(
    client: &ApiClient,
    state: &mut ListState,
    list: &ListResponse,
    action: Action,
) -> Result<(), ActionError> {
    match action {
        Action::Search => {
            let search = ask(Text::new("Search (empty clears):")
                .with_initial_value(&state.search)
                .prompt())?;
            state.set_search(search);
        }
        Action::FilterStatus => {
            let choice = ask(Select::new("Show:", vec!["All", "PAID", "UNPAID"]).prompt())?;
            state.set_status(match choice {
                "PAID" => Some("PAID"),
                "UNPAID" => Some("UNPAID"),
                _ => None,
            });
        }
        Action::ToggleSort => state.toggle_sort(),
        Action::NextPage => state.next_page(list.meta.total_pages),
        Action::PrevPage => state.prev_page(),
        Action::SetLimit => {
            let raw = ask(Text::new("Rows per page (1-100):")
                .with_initial_value(&state.limit.to_string())
                .prompt())?;
            match raw.trim().parse::<i64>() {
                Ok(limit) => state.set_limit(limit),
                Err(_) => println!("Not a number."),
            }
        }
        Action::Create => {
            let payload = CreatePayload {
                invoice_no: ask(Text::new("Invoice no:").prompt())?,
                date: ask(Text::new("Date (YYYY-MM-DD):").prompt())?,
                customer_name: ask(Text::new("Customer name:").prompt())?,
                total: ask(Text::new("Total (e.g. 125.00):").prompt())?,
                note: blank_to_none(ask(Text::new("Note (optional):").prompt())?),
            };
            let created = client.create(&payload)?;
            println!("Created {}.", created.invoice_no);
        }
        Action::Edit => {
            let invoice = pick(&list.items, "Edit which invoice?")?;
            let payload = edit_prompts(invoice)?;
            let updated = client.update(&invoice.id, &payload)?;
            println!("Updated {}.", updated.invoice_no);
        }
        Action::TogglePaid => {
            let invoice = pick(&list.items, "Toggle which invoice?")?;
            let status = if invoice.is_paid() { "UNPAID" } else { "PAID" };
            let payload = UpdatePayload {
                status: Some(status.to_owned()),
                ..UpdatePayload::default()
            };
            let updated = client.update(&invoice.id, &payload)?;
            println!("{} is now {}.", updated.invoice_no, updated.status);
        }
        Action::Delete => {
            let invoice = pick(&list.items, "Delete which invoice?")?;
            let confirmed = ask(Confirm::new(&format!("Delete {}?", invoice.invoice_no))
                .with_default(false)
                .prompt())?;
            if confirmed {
                client.delete(&invoice.id)?;
                println!("Deleted {}.", invoice.invoice_no);
            }
        }
        Action::ExportExcel => save_export(client, state, "excel", "invoices.xlsx")?,
        Action::ExportPdf => save_export(client, state, "pdf", "invoices.pdf")?,
        Action::Refresh | Action::Quit => {}
    }
    Ok(())
}

/// One prefilled prompt per editable field. Only fields whose value actually
/// changed go into the patch; an emptied note clears it on the server.
fn edit_prompts(invoice: &Invoice) -> Result<UpdatePayload, ActionError> {
    let mut payload = UpdatePayload::default();

    let customer = ask(Text::new("Customer name:")
        .with_initial_value(&invoice.customer_name)
        .prompt())?;
    if customer != invoice.customer_name {
        payload.customer_name = Some(customer);
    }

    let date = ask(Text::new("Date (YYYY-MM-DD):")
        .with_initial_value(&invoice.date)
        .prompt())?;
    if date != invoice.date {
        payload.date = Some(date);
    }

    let current_total = plain_decimal(invoice.total_cents);
    let total = ask(Text::new("Total:").with_initial_value(&current_total).prompt())?;
    if total != current_total {
        payload.total = Some(total);
    }

    let current_note = invoice.note.clone().unwrap_or_default();
    let note = ask(Text::new("Note:").with_initial_value(&current_note).prompt())?;
    if note != current_note {
        payload.note = Some(note);
    }

    Ok(payload)
}

fn save_export(
    client: &ApiClient,
    state: &ListState,
    kind: &str,
    filename: &str,
) -> Result<(), ActionError> {
    let bytes = client.export(kind, &state.filter_query())?;
    std::fs::write(filename, &bytes)
        .with_context(|| format!("failed to write {}", filename))
        .map_err(ActionError::Io)?;
    println!("Saved {} ({} bytes).", filename, bytes.len());
    Ok(())
}

fn pick<'a>(items: &'a [Invoice], question: &str) -> Result<&'a Invoice, ActionError> {
    if items.is_empty() {
        println!("No invoices on this page.");
        return Err(ActionError::Cancelled);
    }
    let rows: Vec<Row<'a>> = items.iter().map(Row).collect();
    Ok(ask(Select::new(question, rows).prompt())?.0)
}

struct Row<'a>(&'a Invoice);

impl fmt::Display for Row<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {}  {}  {}",
            self.0.invoice_no,
            self.0.customer_name,
            format_cents(self.0.total_cents),
            self.0.status,
        )
    }
}

/// Esc inside an action flow cancels just that flow.
fn ask<T>(result: Result<T, InquireError>) -> Result<T, ActionError> {
    match result {
        Ok(value) => Ok(value),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => {
            Err(ActionError::Cancelled)
        }
        Err(err) => Err(ActionError::Io(err.into())),
    }
}

/// Esc at the top-level prompts; `None` backs out one level.
fn prompt<T>(result: Result<T, InquireError>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(InquireError::OperationCanceled) | Err(InquireError::OperationInterrupted) => Ok(None),
        Err(err) => bail!(err),
    }
}

fn blank_to_none(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// "1250.5" style, for prefilled edit buffers. Round-trips through the
/// server's decimal parser.
fn plain_decimal(cents: i64) -> String {
    match cents % 100 {
        0 => format!("{}", cents / 100),
        minor if minor % 10 == 0 => format!("{}.{}", cents / 100, minor / 10),
        minor => format!("{}.{:02}", cents / 100, minor),
    }
}

/// Display formatting with thousands separators, matching the server's
/// report rendering.
pub fn format_cents(cents: i64) -> String {
    let dollars = group_thousands(cents / 100);
    match cents % 100 {
        0 => format!("${}", dollars),
        minor if minor % 10 == 0 => format!("${}.{}", dollars, minor / 10),
        minor => format!("${}.{:02}", dollars, minor),
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_cents_for_display() {
        assert_eq!(format_cents(0), "$0");
        assert_eq!(format_cents(125000), "$1,250");
        assert_eq!(format_cents(125050), "$1,250.5");
        assert_eq!(format_cents(125005), "$1,250.05");
        assert_eq!(format_cents(123456789), "$1,234,567.89");
    }

    #[test]
    fn plain_decimal_round_trips() {
        assert_eq!(plain_decimal(125000), "1250");
        assert_eq!(plain_decimal(2999), "29.99");
        assert_eq!(plain_decimal(10), "0.1");
    }
}

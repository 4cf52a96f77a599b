mod api;
mod dashboard;
mod state;

use api::{ApiClient, ApiError};
use clap::{Parser, Subcommand};
use url::Url;

#[derive(Parser)]
#[command(name = "nota", about = "Terminal client for the nota invoice server")]
struct Cli {
    /// Base URL of the server.
    #[arg(long, default_value = "http://127.0.0.1:8000")]
    server: Url,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sign in and manage invoices interactively.
    Dashboard,
    /// Look up an invoice number. Works without signing in.
    Check { invoice_no: String },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let client = ApiClient::new(cli.server)?;
    match cli.command {
        Command::Dashboard => dashboard::run(client),
        Command::Check { invoice_no } => check(&client, &invoice_no),
    }
}

fn check(client: &ApiClient, invoice_no: &str) -> anyhow::Result<()> {
    match client.check(invoice_no) {
        Ok(invoice) => {
            println!(
                "{}  {}  {}  {}",
                invoice.invoice_no,
                invoice.customer_name,
                dashboard::format_cents(invoice.total_cents),
                invoice.status,
            );
            if let Some(paid_at) = invoice.paid_at {
                println!("Paid at {}", paid_at);
            }
            Ok(())
        }
        Err(ApiError::NotFound) => {
            println!("No invoice with number {:?}.", invoice_no);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

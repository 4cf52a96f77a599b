use super::{FilterQuery, OkResponse};
use crate::{
    access,
    error::{self, JsonError, JsonResult},
    state::RocketState,
};
use app::invoice::{self, Changes, NewInvoice, PageRequest, UpdateFields};
use chrono::{DateTime, NaiveDate, Utc};
use rocket::{delete, get, patch, post, serde::json::Json, FromForm, State};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct InvoiceModel {
    id: Uuid,
    /// Unique invoice number, immutable after creation.
    invoice_no: String,
    date: NaiveDate,
    customer_name: String,
    /// Exact amount in hundredths of a dollar.
    total_cents: i64,
    /// "PAID" or "UNPAID".
    status: &'static str,
    /// Settlement time; present exactly when status is "PAID".
    paid_at: Option<DateTime<Utc>>,
    note: Option<String>,
}

impl InvoiceModel {
    fn from_entity(invoice: invoice::Invoice) -> Self {
        Self {
            id: invoice.id.0,
            invoice_no: invoice.invoice_no,
            date: invoice.date,
            customer_name: invoice.customer_name,
            total_cents: invoice.total.0,
            status: invoice.status.as_str(),
            paid_at: invoice.paid_at,
            note: invoice.note,
        }
    }
}

#[derive(Debug, Serialize, JsonSchema)]
pub(super) struct ListResponse {
    items: Vec<InvoiceModel>,
    meta: Meta,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct Meta {
    /// Count of all invoices matching the filter, across all pages.
    total: i64,
    page: i64,
    limit: i64,
    total_pages: i64,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct StatsResponse {
    total_paid_cents: i64,
    total_unpaid_cents: i64,
    total_all_cents: i64,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateRequest {
    invoice_no: Option<String>,
    /// Calendar date, YYYY-MM-DD.
    date: Option<String>,
    customer_name: Option<String>,
    /// Decimal amount with at most 2 fraction digits, e.g. "10.05".
    total: Option<String>,
    note: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub(super) struct UpdateRequest {
    status: Option<String>,
    note: Option<String>,
    customer_name: Option<String>,
    date: Option<String>,
    total: Option<String>,
}

#[derive(Debug, FromForm, JsonSchema)]
pub(super) struct CheckQuery {
    #[field(name = "invoiceNo")]
    invoice_no: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum Error {
    /// A required field is missing.
    MissingFields,
    /// invoiceNo query parameter is missing or empty.
    MissingInvoiceNo,
    /// Total is not a decimal with at most 2 fraction digits.
    InvalidTotal,
    /// Date is not a valid calendar date.
    InvalidDate,
    /// Status must be PAID or UNPAID.
    InvalidStatus,
    /// customerName must not be empty.
    EmptyCustomerName,
    /// The patch contained no recognized field.
    NothingToUpdate,
    /// The invoice number is already in use.
    DuplicateInvoiceNo,
    /// No invoice with that id or number.
    NotFound,
}

fn error_response(e: invoice::Error) -> JsonError<Error> {
    let description = e.to_string();
    match e {
        invoice::Error::MissingFields => error::bad_request(Error::MissingFields, description),
        invoice::Error::MissingInvoiceNo => {
            error::bad_request(Error::MissingInvoiceNo, description)
        }
        invoice::Error::InvalidTotal(_) => error::bad_request(Error::InvalidTotal, description),
        invoice::Error::InvalidDate => error::bad_request(Error::InvalidDate, description),
        invoice::Error::InvalidStatus => error::bad_request(Error::InvalidStatus, description),
        invoice::Error::EmptyCustomerName => {
            error::bad_request(Error::EmptyCustomerName, description)
        }
        invoice::Error::NothingToUpdate => {
            error::bad_request(Error::NothingToUpdate, description)
        }
        invoice::Error::DuplicateInvoiceNo => {
            error::conflict(Error::DuplicateInvoiceNo, description)
        }
        invoice::Error::NotFound => error::not_found(Error::NotFound, description),
    }
}

/// List invoices with search/status filtering, sorting and pagination.
#[openapi(tag = "Invoices")]
#[get("/invoices?<page>&<limit>&<filter..>")]
pub(super) async fn list(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    page: Option<i64>,
    limit: Option<i64>,
    filter: FilterQuery,
) -> Json<ListResponse> {
    let page = invoice::list(
        &state.db,
        &filter.into_filter(),
        PageRequest::clamped(page, limit),
    )
    .await;
    Json(ListResponse {
        items: page.items.into_iter().map(InvoiceModel::from_entity).collect(),
        meta: Meta {
            total: page.total,
            page: page.page,
            limit: page.limit,
            total_pages: page.total_pages,
        },
    })
}

/// Aggregate totals over the entire store, grouped by settlement status.
#[openapi(tag = "Invoices")]
#[get("/invoices/stats")]
pub(super) async fn stats(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
) -> Json<StatsResponse> {
    let totals = invoice::stats(&state.db).await;
    Json(StatsResponse {
        total_paid_cents: totals.paid.0,
        total_unpaid_cents: totals.unpaid.0,
        total_all_cents: totals.all.0,
    })
}

/// Public invoice verification by exact number. The only invoice route that
/// requires no token.
#[openapi(tag = "Invoices")]
#[get("/invoices/check?<query..>")]
pub(super) async fn check(
    state: &State<RocketState>,
    query: CheckQuery,
) -> JsonResult<InvoiceModel, Error> {
    invoice::check(&state.db, query.invoice_no.as_deref().unwrap_or(""))
        .await
        .map(|invoice| Json(InvoiceModel::from_entity(invoice)))
        .map_err(error_response)
}

/// Create a new invoice. New invoices start UNPAID.
#[openapi(tag = "Invoices")]
#[post("/invoices", data = "<req>")]
pub(super) async fn create(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    req: Json<CreateRequest>,
) -> JsonResult<InvoiceModel, Error> {
    let req = req.into_inner();
    invoice::create(
        &state.db,
        NewInvoice {
            invoice_no: req.invoice_no.unwrap_or_default(),
            date: req.date.unwrap_or_default(),
            customer_name: req.customer_name.unwrap_or_default(),
            total: req.total.unwrap_or_default(),
            note: req.note,
        },
    )
    .await
    .map(|invoice| Json(InvoiceModel::from_entity(invoice)))
    .map_err(error_response)
}

/// Partially update an invoice. Setting the status also sets or clears the
/// settlement timestamp; paidAt can never be supplied directly.
#[openapi(tag = "Invoices")]
#[patch("/invoices/<id>", data = "<req>")]
pub(super) async fn update(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    id: String,
    req: Json<UpdateRequest>,
) -> JsonResult<InvoiceModel, Error> {
    let id = parse_id(&id)?;
    let req = req.into_inner();
    let changes = Changes::parse(UpdateFields {
        status: req.status,
        note: req.note,
        customer_name: req.customer_name,
        date: req.date,
        total: req.total,
    })
    .map_err(error_response)?;
    invoice::update(&state.db, id, changes)
        .await
        .map(|invoice| Json(InvoiceModel::from_entity(invoice)))
        .map_err(error_response)
}

/// Permanently delete an invoice.
#[openapi(tag = "Invoices")]
#[delete("/invoices/<id>")]
pub(super) async fn delete(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    id: String,
) -> JsonResult<OkResponse, Error> {
    let id = parse_id(&id)?;
    invoice::delete(&state.db, id)
        .await
        .map(|()| Json(OkResponse::new()))
        .map_err(error_response)
}

// An id that cannot be a UUID cannot name an invoice.
fn parse_id(id: &str) -> Result<invoice::Id, JsonError<Error>> {
    Uuid::from_str(id)
        .map(invoice::Id)
        .map_err(|_| error_response(invoice::Error::NotFound))
}

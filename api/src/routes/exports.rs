//! Document downloads. Both routes apply the same search/status/sort filter
//! as the list route but ignore pagination: the full filtered set is
//! exported.

use super::FilterQuery;
use crate::{access, error, error::JsonError, state::RocketState};
use chrono::Utc;
use rocket::{
    get,
    http::ContentType,
    response::{self, Responder, Response},
    Request, State,
};
use schemars::JsonSchema;
use serde::Serialize;
use std::io::Cursor;

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub(super) enum Error {
    /// Document generation failed; no partial file is produced.
    RenderFailed,
}

/// A generated document streamed as a downloadable attachment with a fixed
/// filename.
pub(super) struct Attachment {
    content_type: ContentType,
    filename: &'static str,
    bytes: Vec<u8>,
}

impl<'r> Responder<'r, 'static> for Attachment {
    fn respond_to(self, _req: &'r Request<'_>) -> response::Result<'static> {
        Response::build()
            .header(self.content_type)
            .raw_header(
                "Content-Disposition",
                format!("attachment; filename={}", self.filename),
            )
            .sized_body(self.bytes.len(), Cursor::new(self.bytes))
            .ok()
    }
}

#[get("/exports/excel?<filter..>")]
pub(super) async fn excel(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    filter: FilterQuery,
) -> Result<Attachment, JsonError<Error>> {
    let items = app::invoice::export_set(&state.db, &filter.into_filter()).await;
    app::export::excel(&items)
        .map(|bytes| Attachment {
            content_type: ContentType::new(
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            filename: "invoices.xlsx",
            bytes,
        })
        .map_err(render_error)
}

#[get("/exports/pdf?<filter..>")]
pub(super) async fn pdf(
    state: &State<RocketState>,
    _guard: access::AdminGuard,
    filter: FilterQuery,
) -> Result<Attachment, JsonError<Error>> {
    let items = app::invoice::export_set(&state.db, &filter.into_filter()).await;
    app::export::pdf(&items, Utc::now())
        .map(|bytes| Attachment {
            content_type: ContentType::PDF,
            filename: "invoices.pdf",
            bytes,
        })
        .map_err(render_error)
}

fn render_error(e: app::export::Error) -> JsonError<Error> {
    log::error!("export rendering failed: {}", e);
    error::internal_server_error(Error::RenderFailed, e.to_string())
}

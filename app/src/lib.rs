//! Domain logic for the Nota invoice tracker: the credential store, session
//! tokens, the invoice table with its query and mutation operations, and the
//! spreadsheet/PDF export renderers. The `api` crate exposes all of this
//! over HTTP.

pub mod admin;
pub mod auth;
pub mod database;
pub mod export;
pub mod invoice;
pub mod money;

pub use money::Cents;

//! Blocking HTTP client for the nota server. Wire shapes mirror the server's
//! JSON exactly; dates and timestamps stay as strings since the terminal
//! only displays them.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("not signed in, or the token has expired")]
    Unauthorized,
    #[error("not found")]
    NotFound,
    #[error("server rejected the request ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("cannot reach server: {0}")]
    Transport(#[from] reqwest::Error),
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    pub id: String,
    pub invoice_no: String,
    pub date: String,
    pub customer_name: String,
    pub total_cents: i64,
    pub status: String,
    pub paid_at: Option<String>,
    pub note: Option<String>,
}

impl Invoice {
    pub fn is_paid(&self) -> bool {
        self.status == "PAID"
    }
}

#[derive(Debug, Deserialize)]
pub struct ListResponse {
    pub items: Vec<Invoice>,
    pub meta: Meta,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_paid_cents: i64,
    pub total_unpaid_cents: i64,
    pub total_all_cents: i64,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePayload {
    pub invoice_no: String,
    pub date: String,
    pub customer_name: String,
    pub total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Partial update; absent fields are left untouched by the server.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    description: String,
}

/// A bearer token from a successful login. Held only in memory; signing in
/// again replaces it.
struct Session {
    token: String,
}

pub struct ApiClient {
    http: reqwest::blocking::Client,
    base: Url,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base: Url) -> ApiResult<Self> {
        Ok(Self {
            http: reqwest::blocking::Client::builder().build()?,
            base,
            session: None,
        })
    }

    pub fn signed_in(&self) -> bool {
        self.session.is_some()
    }

    /// Drops the current token. Called after any 401 so the next action
    /// forces a fresh login.
    pub fn clear_session(&mut self) {
        self.session = None;
    }

    pub fn login(&mut self, username: &str, password: &str) -> ApiResult<()> {
        let resp = self
            .http
            .post(self.endpoint("/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()?;
        let token = read_json::<TokenResponse>(resp)?.token;
        self.session = Some(Session { token });
        Ok(())
    }

    pub fn list(&self, query: &[(&'static str, String)]) -> ApiResult<ListResponse> {
        let req = self.authed(self.http.get(self.endpoint("/invoices")))?;
        read_json(req.query(query).send()?)
    }

    pub fn stats(&self) -> ApiResult<Stats> {
        let req = self.authed(self.http.get(self.endpoint("/invoices/stats")))?;
        read_json(req.send()?)
    }

    /// The one call that works without a login.
    pub fn check(&self, invoice_no: &str) -> ApiResult<Invoice> {
        let resp = self
            .http
            .get(self.endpoint("/invoices/check"))
            .query(&[("invoiceNo", invoice_no)])
            .send()?;
        read_json(resp)
    }

    pub fn create(&self, payload: &CreatePayload) -> ApiResult<Invoice> {
        let req = self.authed(self.http.post(self.endpoint("/invoices")))?;
        read_json(req.json(payload).send()?)
    }

    pub fn update(&self, id: &str, payload: &UpdatePayload) -> ApiResult<Invoice> {
        let url = self.endpoint(&format!("/invoices/{}", id));
        let req = self.authed(self.http.patch(url))?;
        read_json(req.json(payload).send()?)
    }

    pub fn delete(&self, id: &str) -> ApiResult<()> {
        let url = self.endpoint(&format!("/invoices/{}", id));
        let req = self.authed(self.http.delete(url))?;
        check_status(req.send()?)?;
        Ok(())
    }

    /// Downloads an export document as raw bytes. `kind` is "excel" or
    /// "pdf"; the filter query matches the list route's.
    pub fn export(&self, kind: &str, query: &[(&'static str, String)]) -> ApiResult<Vec<u8>> {
        let url = self.endpoint(&format!("/exports/{}", kind));
        let req = self.authed(self.http.get(url))?;
        let resp = check_status(req.query(query).send()?)?;
        Ok(resp.bytes()?.to_vec())
    }

    // Appends to the base URL's path, so a --server with a prefix
    // ("http://host/nota") keeps routing through that prefix.
    fn endpoint(&self, path: &str) -> Url {
        let mut url = self.base.clone();
        let joined = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            path.trim_start_matches('/'),
        );
        url.set_path(&joined);
        url
    }

    fn authed(
        &self,
        req: reqwest::blocking::RequestBuilder,
    ) -> ApiResult<reqwest::blocking::RequestBuilder> {
        match &self.session {
            Some(session) => Ok(req.bearer_auth(&session.token)),
            None => Err(ApiError::Unauthorized),
        }
    }
}

fn check_status(resp: reqwest::blocking::Response) -> ApiResult<reqwest::blocking::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ApiError::Unauthorized);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound);
    }
    let message = resp
        .json::<ErrorEnvelope>()
        .map(|envelope| envelope.error.description)
        .unwrap_or_else(|_| status.to_string());
    Err(ApiError::Server {
        status: status.as_u16(),
        message,
    })
}

fn read_json<T: serde::de::DeserializeOwned>(resp: reqwest::blocking::Response) -> ApiResult<T> {
    Ok(check_status(resp)?.json()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(Url::parse(base).unwrap()).unwrap()
    }

    #[test]
    fn endpoint_appends_to_a_bare_host() {
        let client = client("http://127.0.0.1:8000");
        assert_eq!(
            client.endpoint("/invoices").as_str(),
            "http://127.0.0.1:8000/invoices"
        );
        assert_eq!(
            client.endpoint("/auth/login").as_str(),
            "http://127.0.0.1:8000/auth/login"
        );
    }

    #[test]
    fn endpoint_keeps_a_server_path_prefix() {
        for base in ["http://host/nota", "http://host/nota/"] {
            let client = client(base);
            assert_eq!(
                client.endpoint("/invoices/check").as_str(),
                "http://host/nota/invoices/check"
            );
        }
    }
}

//! HTTP access to upstream REST APIs and the status → user message mapping.

use athena_core::{PluginError, Result};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::debug;

pub const RATE_LIMITED: &str = "Rate limit exceeded. Please try again later.";
pub const INVALID_REQUEST: &str = "Invalid request parameters. Please check your input.";

/// How requests to an upstream are authenticated.
#[derive(Debug, Clone)]
pub enum Auth {
    None,
    /// A named header carrying the key, e.g. `x-cg-demo-api-key`.
    Header { name: String, value: String },
    Bearer(String),
}

/// A `reqwest::Client` bound to one API's base URL and credentials.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
    auth: Auth,
}

impl UpstreamClient {
    pub fn new(base_url: impl Into<String>, auth: Auth) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, auth)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, auth: Auth) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// A GET builder with auth and `accept: application/json` applied.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.get(self.url(path)))
            .header("accept", "application/json")
    }

    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(self.url(path)))
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Auth::None => req,
            Auth::Header { name, value } => req.header(name.as_str(), value.as_str()),
            Auth::Bearer(token) => req.bearer_auth(token),
        }
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url = %self.url(path), ?query, "GET");
        send_json(self.get(path).query(query)).await
    }

    /// Like [`get_json`](Self::get_json) with a per-request timeout.
    pub async fn get_json_with_timeout<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        debug!(url = %self.url(path), ?query, timeout_ms = timeout.as_millis() as u64, "GET");
        send_json(self.get(path).query(query).timeout(timeout)).await
    }

    pub async fn post_json<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        debug!(url = %self.url(path), "POST");
        send_json(self.post(path).json(body)).await
    }
}

/// Send a request and decode a JSON body.
///
/// Transport failures and non-2xx statuses become `UpstreamHttp`; an
/// undecodable body becomes `InvalidResponse`.
pub async fn send_json<T: DeserializeOwned>(req: reqwest::RequestBuilder) -> Result<T> {
    let resp = check_status(req).await?;
    resp.json::<T>()
        .await
        .map_err(|e| PluginError::InvalidResponse(e.to_string()))
}

/// Send a request and fail on a non-2xx status.
pub async fn check_status(req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let resp = req.send().await.map_err(|e| PluginError::UpstreamHttp {
        status: e.status().map(|s| s.as_u16()),
        message: e.to_string(),
    })?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(PluginError::UpstreamHttp {
            status: Some(status.as_u16()),
            message: format!("HTTP {status}: {body}"),
        });
    }
    Ok(resp)
}

/// Per-API wording of upstream failures.
#[derive(Debug, Clone, Copy)]
pub struct ErrorMessages {
    /// What was being fetched, e.g. "market data".
    pub subject: &'static str,
    /// Text for 403 responses.
    pub forbidden: &'static str,
}

impl ErrorMessages {
    pub const fn new(subject: &'static str, forbidden: &'static str) -> Self {
        Self { subject, forbidden }
    }

    pub fn user_message(&self, err: &PluginError) -> String {
        match err.status() {
            Some(429) => RATE_LIMITED.to_string(),
            Some(403) => self.forbidden.to_string(),
            Some(400) => INVALID_REQUEST.to_string(),
            _ => format!("Error fetching {}: {}", self.subject, err),
        }
    }

    /// Structured `error` payload delivered alongside the text.
    pub fn payload(&self, err: &PluginError) -> Value {
        let status = err.status();
        json!({
            "message": err.to_string(),
            "statusCode": status,
            "requiresElevatedAccess": status == Some(403),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGES: ErrorMessages = ErrorMessages::new("market data", "Upgrade required.");

    fn http(status: u16) -> PluginError {
        PluginError::UpstreamHttp {
            status: Some(status),
            message: format!("HTTP {status}"),
        }
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(MESSAGES.user_message(&http(429)), RATE_LIMITED);
        assert_eq!(MESSAGES.user_message(&http(403)), "Upgrade required.");
        assert_eq!(MESSAGES.user_message(&http(400)), INVALID_REQUEST);
        assert_eq!(
            MESSAGES.user_message(&http(500)),
            "Error fetching market data: HTTP 500"
        );
    }

    #[test]
    fn test_payload_flags_forbidden() {
        let p = MESSAGES.payload(&http(403));
        assert_eq!(p["statusCode"], 403);
        assert_eq!(p["requiresElevatedAccess"], true);
        let p = MESSAGES.payload(&PluginError::InvalidResponse("empty".into()));
        assert!(p["statusCode"].is_null());
    }

    #[test]
    fn test_url_joining() {
        let c = UpstreamClient::new("https://api.example.com/v3/", Auth::None);
        assert_eq!(c.url("/coins/list"), "https://api.example.com/v3/coins/list");
        assert_eq!(c.url("coins/list"), "https://api.example.com/v3/coins/list");
    }
}

use super::error::{normalize_error_message, ApiError};
use crate::config::{resolve_base_url, SettingsSource};

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Header carrying the user API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Join a base URL and a path with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    let base = resolve_base_url(Some(base));
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Body of an outgoing request.
#[derive(Debug)]
pub enum RequestBody {
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

/// Options for a single request.
#[derive(Debug)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<RequestBody>,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub admin_token: Option<String>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::GET,
            body: None,
            headers: Vec::new(),
            query: Vec::new(),
            admin_token: None,
        }
    }
}

impl RequestOptions {
    pub fn get() -> Self {
        Self::default()
    }

    pub fn post() -> Self {
        Self {
            method: Method::POST,
            ..Self::default()
        }
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn admin_token(mut self, token: impl Into<String>) -> Self {
        self.admin_token = Some(token.into());
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

/// Encode a request payload as a JSON body.
pub(crate) fn to_json_body<T: serde::Serialize>(payload: &T) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(payload)
        .map_err(|e| ApiError::precondition(format!("Failed to encode request body: {e}")))
}

fn is_json_response(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| mime::Mime::from_str(v).ok())
        .map(|m| {
            m.essence_str() == mime::APPLICATION_JSON.essence_str()
                || m.suffix() == Some(mime::JSON)
        })
        .unwrap_or(false)
}

/// HTTP client for the reminder backend.
///
/// Every call resolves its URL and API key from the settings source at call
/// time, so settings changes apply to the next request.
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    settings: Arc<dyn SettingsSource>,
}

impl ApiClient {
    pub fn new(settings: Arc<dyn SettingsSource>) -> Self {
        Self {
            http: Client::new(),
            settings,
        }
    }

    /// Build a client whose requests give up after `timeout`.
    pub fn with_timeout(
        settings: Arc<dyn SettingsSource>,
        timeout: Option<Duration>,
    ) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            http: builder.build()?,
            settings,
        })
    }

    /// Build a client around a preconfigured `reqwest` client.
    pub fn with_http_client(settings: Arc<dyn SettingsSource>, http: Client) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &Arc<dyn SettingsSource> {
        &self.settings
    }

    /// Absolute URL for `path` under the configured base URL.
    pub fn url_for(&self, path: &str) -> String {
        join_url(&self.settings.api_base_url(), path)
    }

    /// The configured API key, or a precondition error.
    pub fn require_api_key(&self) -> Result<String, ApiError> {
        self.settings.api_key().ok_or_else(ApiError::api_key_required)
    }

    /// The configured admin token, or a precondition error.
    pub fn require_admin_token(&self) -> Result<String, ApiError> {
        self.settings
            .admin_token()
            .ok_or_else(ApiError::admin_token_required)
    }

    fn build_headers(&self, options: &RequestOptions) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();

        for (name, value) in &options.headers {
            let name = HeaderName::from_str(name)
                .map_err(|e| ApiError::precondition(format!("Invalid header name '{name}': {e}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::precondition(format!("Invalid header value: {e}")))?;
            headers.insert(name, value);
        }

        if matches!(options.body, Some(RequestBody::Json(_))) && !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        if let Some(key) = self.settings.api_key() {
            let value = HeaderValue::from_str(&key)
                .map_err(|_| ApiError::precondition("API key contains invalid characters"))?;
            headers.insert(API_KEY_HEADER, value);
        }

        if let Some(token) = options.admin_token.as_deref() {
            let value = HeaderValue::from_str(token)
                .map_err(|_| ApiError::precondition("Admin token contains invalid characters"))?;
            headers.insert(ADMIN_TOKEN_HEADER, value);
        }

        Ok(headers)
    }

    /// Send one request and turn non-2xx answers into [`ApiError::Server`].
    async fn send(&self, path: &str, options: RequestOptions) -> Result<Response, ApiError> {
        let url = self.url_for(path);
        let headers = self.build_headers(&options)?;

        debug!(method = %options.method, url = %url, "Sending request");

        let mut builder = self.http.request(options.method, &url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        builder = match options.body {
            Some(RequestBody::Json(value)) => builder.body(serde_json::to_vec(&value).map_err(
                |e| ApiError::precondition(format!("Failed to encode request body: {e}")),
            )?),
            Some(RequestBody::Multipart(form)) => builder.multipart(form),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = normalize_error_message(status.as_u16(), &body);
        warn!(url = %url, status = status.as_u16(), "Request failed: {}", message);

        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    /// Perform a request; JSON responses are parsed, anything else is text.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<ResponseBody, ApiError> {
        let response = self.send(path, options).await?;
        let json = is_json_response(&response);
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !json {
            return Ok(ResponseBody::Text(text));
        }
        if text.trim().is_empty() {
            return Ok(ResponseBody::Json(serde_json::Value::Null));
        }
        serde_json::from_str(&text)
            .map(ResponseBody::Json)
            .map_err(|e| ApiError::Decode(format!("Invalid JSON response: {e}")))
    }

    /// Perform a request and decode the body into `T`.
    pub async fn request_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let value = match self.request(path, options).await? {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => serde_json::from_str(&text)
                .map_err(|e| ApiError::Decode(format!("Expected JSON response: {e}")))?,
        };
        serde_json::from_value(value)
            .map_err(|e| ApiError::Decode(format!("Unexpected response shape: {e}")))
    }

    /// Perform a request and return the raw body bytes.
    pub async fn request_bytes(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<Bytes, ApiError> {
        let response = self.send(path, options).await?;
        response
            .bytes()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_API_BASE_URL;

    #[test]
    fn join_collapses_slashes() {
        let cases = [
            ("http://api.test", "/chat"),
            ("http://api.test/", "chat"),
            ("http://api.test///", "///chat"),
            ("http://api.test/", "/chat"),
        ];
        for (base, path) in cases {
            assert_eq!(join_url(base, path), "http://api.test/chat", "{base} + {path}");
        }
    }

    #[test]
    fn join_keeps_base_path_prefix() {
        assert_eq!(
            join_url("https://host/api/v1/", "/reminders/1/cancel"),
            "https://host/api/v1/reminders/1/cancel"
        );
    }

    #[test]
    fn join_with_empty_base_uses_default() {
        assert_eq!(join_url("", "/healthz"), format!("{DEFAULT_API_BASE_URL}/healthz"));
    }

    #[test]
    fn options_builder_collects_parts() {
        let opts = RequestOptions::post()
            .json(serde_json::json!({"a": 1}))
            .header("X-Trace", "1")
            .query("limit", "5")
            .admin_token("secret");
        assert_eq!(opts.method, Method::POST);
        assert!(matches!(opts.body, Some(RequestBody::Json(_))));
        assert_eq!(opts.headers.len(), 1);
        assert_eq!(opts.query, vec![("limit".to_string(), "5".to_string())]);
        assert_eq!(opts.admin_token.as_deref(), Some("secret"));
    }
}

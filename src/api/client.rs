use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::api::response::normalize_error;
use crate::config::AppConfig;
use crate::error::ApiError;

/// Thin wrapper over `reqwest::Client` bound to one backend base URL.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    log_requests: bool,
}

impl ApiClient {
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL or the
    /// HTTP client cannot be built.
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Self::build(base_url, Client::builder(), true)
    }

    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::build(&config.api.base_url, builder, config.api.enable_request_logging)
    }

    fn build(
        base_url: &str,
        builder: reqwest::ClientBuilder,
        log_requests: bool,
    ) -> anyhow::Result<Self> {
        let parsed = Url::parse(base_url)?;
        match parsed.scheme() {
            "http" | "https" => {}
            scheme => anyhow::bail!("Error parsing URL: unsupported scheme {scheme}"),
        }
        if parsed.host().is_none() {
            anyhow::bail!("Error parsing URL: no host specified");
        }

        let http = builder
            .user_agent(concat!("useradmin/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            log_requests,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether each request and reply is traced at debug level
    pub fn logs_requests(&self) -> bool {
        self.log_requests
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a JSON request and return the decoded reply body (`Null` when
    /// empty). Error statuses go through `normalize_error` with `fallback`
    /// as the message of last resort.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
        fallback: &str,
    ) -> Result<Value, ApiError> {
        let url = self.endpoint(path);
        if self.log_requests {
            tracing::debug!(http.method = %method, url = %url, auth = token.is_some(), "sending request");
        }

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::warn!("{} {} failed without a reply: {}", method, url, e);
            ApiError::Connectivity
        })?;

        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) if status.is_success() => {
                return Err(ApiError::unexpected_response(e.to_string()));
            }
            Err(e) => {
                tracing::debug!("could not read error body: {}", e);
                Default::default()
            }
        };

        if self.log_requests {
            tracing::debug!(http.method = %method, url = %url, status = status.as_u16(), "received reply");
        }

        if status.is_success() {
            if bytes.is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&bytes)
                .map_err(|e| ApiError::unexpected_response(e.to_string()));
        }

        let body = decode_error_body(&bytes);
        Err(normalize_error(status.as_u16(), &body, fallback))
    }
}

// Error bodies are not always JSON; keep plain text so it can be shown as-is
fn decode_error_body(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

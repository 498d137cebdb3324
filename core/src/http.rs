use crate::config::ClientConfig;
use crate::error::{NessusError, Result};
use crate::filter::EncodedFilters;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, RETRY_AFTER};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::Duration;

const MAX_BACKOFF_EXPONENT: u32 = 6;
/// Upper bound on a server-supplied `Retry-After` wait.
pub const MAX_RETRY_AFTER: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    fn as_reqwest(self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request relative to the manager's base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::Put, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attaches translated filters: query pairs where the encoding has
    /// them, otherwise merged into the JSON object body.
    pub fn filters(mut self, encoded: &EncodedFilters) -> Self {
        match encoded.query_pairs() {
            Some(pairs) => self.query.extend(pairs),
            None => {
                let mut body = match self.body.take() {
                    Some(Value::Object(map)) => map,
                    _ => Map::new(),
                };
                body.extend(encoded.to_json());
                self.body = Some(Value::Object(body));
            }
        }
        self
    }
}

/// A successful response body.
#[derive(Debug, Clone, Default)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Empty bodies parse as `null`.
    pub fn value(&self, path: &str) -> Result<Value> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&self.body)
            .map_err(|e| NessusError::invalid_response(path, e.to_string()))
    }

    pub fn json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| NessusError::invalid_response(path, e.to_string()))
    }

    /// Pulls `field` out of a JSON object body.
    pub fn field<T: DeserializeOwned>(&self, path: &str, field: &str) -> Result<T> {
        let mut value = self.value(path)?;
        let inner = value.get_mut(field).map(Value::take).ok_or_else(|| {
            NessusError::invalid_response(path, format!("missing '{}' field", field))
        })?;
        serde_json::from_value(inner)
            .map_err(|e| NessusError::invalid_response(path, e.to_string()))
    }
}

/// Sends one logical request; retries are the implementation's concern.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    base_url: Url,
    retries: u32,
    backoff: Duration,
}

impl HttpClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert("x-apikeys", api_keys_value(&config.access_key, &config.secret_key)?);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent(config.ua_identity.as_deref()))
            .timeout(config.timeout())
            .danger_accept_invalid_certs(!config.verify)
            .build()
            .map_err(|e| NessusError::Config {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            client,
            base_url: base_url(&config.url)?,
            retries: config.retries,
            backoff: config.backoff(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| NessusError::Config {
                message: format!("cannot build URL for '{}': {}", path, e),
            })
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(2u32.pow(attempt.min(MAX_BACKOFF_EXPONENT)))
    }

    async fn execute(&self, request: &ApiRequest, url: Url) -> reqwest::Result<reqwest::Response> {
        let mut builder = self.client.request(request.method.as_reqwest(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        builder.send().await
    }
}

#[async_trait]
impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let url = self.url_for(&request.path)?;
        let path = request.path.as_str();
        let mut attempt = 0;

        loop {
            tracing::debug!(method = ?request.method, path, attempt, "sending request");

            match self.execute(&request, url.clone()).await {
                Ok(response) if response.status().is_success() => {
                    let status = response.status().as_u16();
                    let body = response.bytes().await.map_err(|e| NessusError::Request {
                        path: path.to_string(),
                        source: e,
                    })?;
                    return Ok(ApiResponse::new(status, body.to_vec()));
                }
                Ok(response) if response.status() == StatusCode::TOO_MANY_REQUESTS => {
                    if attempt >= self.retries {
                        return Err(NessusError::RateLimited {
                            path: path.to_string(),
                            attempts: attempt + 1,
                        });
                    }
                    let delay = retry_after(response.headers()).unwrap_or(self.backoff);
                    tracing::debug!(path, ?delay, "rate limited, backing off");
                    tokio::time::sleep(delay).await;
                }
                Ok(response) if is_transient(response.status()) && attempt < self.retries => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        path,
                        status = response.status().as_u16(),
                        ?delay,
                        "transient server error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Ok(response) => {
                    let status = response.status().as_u16();
                    let message = response.text().await.unwrap_or_default();
                    return Err(NessusError::from_status(path, status, message));
                }
                Err(e) if attempt < self.retries && (e.is_connect() || e.is_timeout()) => {
                    let delay = self.delay_for(attempt);
                    tracing::debug!(path, error = %e, ?delay, "request failed, retrying");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    return Err(NessusError::Request {
                        path: path.to_string(),
                        source: e,
                    });
                }
            }

            attempt += 1;
        }
    }
}

pub fn api_keys_header(access_key: &str, secret_key: &str) -> String {
    format!("accessKey={}; secretKey={};", access_key, secret_key)
}

/// The `X-APIKeys` header value, marked sensitive so it never shows up in
/// debug output.
fn api_keys_value(access_key: &str, secret_key: &str) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&api_keys_header(access_key, secret_key)).map_err(
        |_| NessusError::Config {
            message: "API keys contain characters not allowed in a header".to_string(),
        },
    )?;
    value.set_sensitive(true);
    Ok(value)
}

pub fn user_agent(identity: Option<&str>) -> String {
    let base = format!("nessus-rs/{}", env!("CARGO_PKG_VERSION"));
    match identity.map(str::trim).filter(|i| !i.is_empty()) {
        Some(identity) => format!("{} ({})", base, identity),
        None => base,
    }
}

/// Parses the base URL, forcing a trailing slash so joins append.
fn base_url(raw: &str) -> Result<Url> {
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    Url::parse(&normalized).map_err(|e| NessusError::Config {
        message: format!("invalid url '{}': {}", raw, e),
    })
}

fn is_transient(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::BAD_GATEWAY | StatusCode::SERVICE_UNAVAILABLE | StatusCode::GATEWAY_TIMEOUT
    )
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|secs| secs.is_finite() && *secs >= 0.0)
        .map(|secs| {
            Duration::try_from_secs_f64(secs)
                .unwrap_or(MAX_RETRY_AFTER)
                .min(MAX_RETRY_AFTER)
        })
}

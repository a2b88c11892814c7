//! HTTP implementation of the API transport.

use crate::error::{ApiError, ApiResult};
use crate::transport::ApiTransport;
use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Header carrying the account's API key on every request.
const API_KEY_HEADER: &str = "apikey";

/// Configuration for the HTTP transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API root the relative request paths are joined onto,
    /// e.g. `https://demo.kartei.app/api/1`.
    pub base_url: String,
    /// Account API key, sent with every request.
    pub api_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
        }
    }
}

/// HTTP transport speaking the server's JSON conventions.
pub struct HttpTransport {
    config: ApiConfig,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport. The reqwest client is built once and reused
    /// for connection pooling.
    pub fn new(config: ApiConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to create HTTP client");

        Self { config, client }
    }

    async fn send(&self, method: Method, path: &str, body: Option<Value>) -> ApiResult<Value> {
        if self.config.base_url.is_empty() {
            return Err(ApiError::Config("no API base URL configured".to_string()));
        }
        if self.config.api_key.is_empty() {
            return Err(ApiError::Config("no API key configured".to_string()));
        }

        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, &self.config.api_key);
        if let Some(body) = body {
            request = request.json(&body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        classify(status, &method, &url, &text)
    }
}

#[async_trait]
impl ApiTransport for HttpTransport {
    async fn get(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(Method::POST, path, Some(body)).await
    }

    async fn put(&self, path: &str, body: Value) -> ApiResult<Value> {
        self.send(Method::PUT, path, Some(body)).await
    }

    async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::DELETE, path, None).await
    }
}

/// Maps a response onto the server's status conventions.
fn classify(status: StatusCode, method: &Method, url: &str, text: &str) -> ApiResult<Value> {
    let detail = || format!("{method} {url}: {text}");
    match status.as_u16() {
        200 | 201 => {
            if text.trim().is_empty() {
                return Err(ApiError::InvalidBody(format!(
                    "{method} {url}: empty body on {status}"
                )));
            }
            serde_json::from_str(text)
                .map_err(|e| ApiError::InvalidBody(format!("{method} {url}: unparsable JSON: {e}")))
        }
        204 => {
            if text.is_empty() {
                Ok(Value::Null)
            } else {
                Err(ApiError::InvalidBody(format!(
                    "{method} {url}: 204 carried a body: {text}"
                )))
            }
        }
        401 => Err(ApiError::Unauthorized(detail())),
        404 => Err(ApiError::NotFound(detail())),
        425 => Err(ApiError::RateLimited(detail())),
        500 | 501 => Err(ApiError::Server(detail())),
        502 | 503 => Err(ApiError::Unavailable(detail())),
        other => Err(ApiError::UnexpectedStatus {
            status: other,
            detail: detail(),
        }),
    }
}

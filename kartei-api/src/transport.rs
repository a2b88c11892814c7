//! API transport abstraction.
//!
//! The cache layer depends on this trait rather than on a concrete HTTP
//! client, which keeps request coalescing testable and the wire plumbing
//! swappable.

use crate::error::ApiResult;
use async_trait::async_trait;
use serde_json::Value;

/// Abstract JSON API transport.
///
/// Paths are relative to the configured API root (`definition/person`,
/// `object/550`); implementations own URL building, authentication and
/// status handling. Methods resolve to the parsed response body, or
/// `Value::Null` for bodyless success statuses.
#[async_trait]
pub trait ApiTransport: Send + Sync {
    /// Fetches a resource.
    async fn get(&self, path: &str) -> ApiResult<Value>;

    /// Creates a resource; `body` is sent as JSON.
    async fn post(&self, path: &str, body: Value) -> ApiResult<Value>;

    /// Replaces a resource; `body` is sent as JSON.
    async fn put(&self, path: &str, body: Value) -> ApiResult<Value>;

    /// Deletes a resource.
    async fn delete(&self, path: &str) -> ApiResult<Value>;
}

//! HTTP API transport for Kartei.
//!
//! The caches in `kartei-cache` talk to the server exclusively through the
//! [`ApiTransport`] trait defined here; [`HttpTransport`] is its production
//! implementation: JSON over HTTPS, a static `apikey` header, and the
//! server's status conventions mapped onto [`ApiError`]. Consumers treat
//! every error as opaque — classification exists for operators reading
//! logs, not for retry logic in the cache layer.

mod error;
mod http;
mod transport;

pub use error::{ApiError, ApiResult};
pub use http::{ApiConfig, HttpTransport};
pub use transport::ApiTransport;

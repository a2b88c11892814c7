//! Error types for API operations.

use thiserror::Error;

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by the API transport.
///
/// The variants mirror the server's status conventions: auth failures and
/// missing records are distinct from quota refusals, gateway outages and
/// genuine server faults. Each carries the request line and the response
/// text so a log line is enough to reconstruct what happened.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The transport was constructed without a usable base URL or API key.
    #[error("api configuration invalid: {0}")]
    Config(String),

    /// 401 — the API key was missing, revoked or wrong.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// 404 — the addressed record or schema does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// 425 — the account's request quota is exhausted.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// 500/501 — the server failed internally.
    #[error("server error: {0}")]
    Server(String),

    /// 502/503 — the server is unreachable behind its gateway or locked
    /// for maintenance.
    #[error("service unavailable: {0}")]
    Unavailable(String),

    /// Any status outside the documented conventions.
    #[error("unexpected status {status}: {detail}")]
    UnexpectedStatus { status: u16, detail: String },

    /// A success status whose body violated the protocol (empty where JSON
    /// was promised, non-empty 204, or unparsable JSON).
    #[error("invalid response body: {0}")]
    InvalidBody(String),

    /// Connection-level failure before any status was received.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

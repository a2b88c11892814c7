//! Error types for cache operations.

use kartei_api::ApiError;
use kartei_types::{InstanceId, PropertyId};
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors surfaced by the caches and the aggregator.
///
/// Decode problems never show up here: a record that arrives with a bad
/// date or a malformed embedded payload still decodes, with the affected
/// values nulled. These errors mean a record did not arrive at all, or the
/// caller asked for something the schema cannot answer.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The transport refused or failed the request.
    #[error("api error: {0}")]
    Api(#[from] ApiError),

    /// A shared load settled on failure. Every caller suspended on that
    /// load sees the same reason.
    #[error("load failed for {entity}: {reason}")]
    LoadFailed { entity: String, reason: String },

    /// An aggregated record turned out to have a different type than the
    /// aggregation asked for.
    #[error("instance {id} has type {found}, expected {expected}")]
    TypeMismatch {
        id: InstanceId,
        expected: String,
        found: String,
    },

    /// A property id resolved to no schema property, or to more than one.
    #[error("property {property_id} does not resolve to exactly one schema property")]
    UnknownProperty { property_id: PropertyId },
}

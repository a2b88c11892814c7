//! Core type definitions for Kartei.
//!
//! This crate defines the fundamental, schema-agnostic types used throughout
//! the client data core:
//! - Instance and property identifiers (numeric wire ids)
//! - The open [`Datatype`] enum that selects decode and format rules
//! - Wire date/timestamp parsing (`"YYYY-MM-DD"`, `"YYYY-MM-DD HH:MM:SS"`)
//!
//! Schema- and record-shaped types (definitions, instances, property values)
//! belong in `kartei-model`, not here.

mod datatype;
mod ids;
mod timestamp;

pub use datatype::Datatype;
pub use ids::{InstanceId, PropertyId};
pub use timestamp::{
    WIRE_DATE_FORMAT, WIRE_TIMESTAMP_FORMAT, parse_wire_date, parse_wire_timestamp,
};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid instance id: {0}")]
    InvalidInstanceId(String),

    #[error("invalid property id: {0}")]
    InvalidPropertyId(String),
}

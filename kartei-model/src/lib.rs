//! Data model for the Kartei client core.
//!
//! Defines the types the caches exchange and the pure transforms between
//! them:
//! - [`Definition`] / [`PropertySpec`] — the schema of one type name
//! - [`RawInstance`] — a wire record as fetched, keyed by numeric property id
//! - [`Instance`] — a decoded record, keyed by property title, with a
//!   derived display label
//! - [`PropertyValue`] — decoded values (dates, timestamps, attachments,
//!   passthrough JSON)
//! - [`decode_instance`] — raw record + definition → ready instance
//! - [`format_value`] — the canonical string rendering used for labels and
//!   aggregation grouping
//!
//! Everything here is synchronous and side-effect free; fetching, caching
//! and batching live in `kartei-cache`.

mod decode;
mod format;
mod instance;
mod schema;
mod value;

pub use decode::{compute_label, decode_instance};
pub use format::format_value;
pub use instance::{Instance, InstanceMeta, RawInstance, RawMeta};
pub use schema::{Definition, PropertyCategory, PropertySpec};
pub use value::{AttachmentValue, PropertyValue};

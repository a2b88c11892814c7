use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// A decoded property value.
///
/// Values the decode rules interpret get dedicated variants; everything
/// else passes through as [`PropertyValue::Json`]. `Null` covers both
/// explicit wire nulls and decode degradation (unparsable dates, malformed
/// embedded JSON, non-object attachments).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Null,
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Attachment(AttachmentValue),
    Json(serde_json::Value),
}

impl PropertyValue {
    /// Wraps a raw wire value: JSON null becomes [`PropertyValue::Null`],
    /// everything else passes through unchanged.
    #[must_use]
    pub fn from_raw(value: serde_json::Value) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Json(value)
        }
    }

    /// True when the value is null.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the value as a string, when it is a passthrough JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Json(value) => value.as_str(),
            _ => None,
        }
    }

    /// Returns the decoded calendar date, when the value is one.
    #[must_use]
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            _ => None,
        }
    }

    /// Returns the decoded timestamp, when the value is one.
    #[must_use]
    pub fn as_timestamp(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Timestamp(ts) => Some(*ts),
            _ => None,
        }
    }
}

/// Decoded attachment object (`image`, `file` and `binary` datatypes).
///
/// The wire object's `lastmodified` string is parsed into a timestamp; all
/// other members are kept untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AttachmentValue {
    pub lastmodified: Option<NaiveDateTime>,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

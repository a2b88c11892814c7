//! Property datatypes.
//!
//! The schema declares a datatype per property; it selects the decode rule
//! applied to raw wire values and the canonical string rendering used for
//! labels and aggregation. The enumeration is open on the wire, so unknown
//! names deserialize to [`Datatype::Other`] and their values pass through
//! untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared value-kind of a property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Datatype {
    /// Free-form scalar, stored as-is.
    #[default]
    Plain,
    /// Single enumerated value.
    #[serde(rename = "enum")]
    Enumeration,
    /// List of enumerated values.
    Multienum,
    /// Calendar date, `"YYYY-MM-DD"` on the wire.
    Date,
    /// Date and time, `"YYYY-MM-DD HH:MM:SS"` on the wire.
    Timestamp,
    /// Image attachment; the raw value carries a nested `lastmodified`.
    Image,
    /// File attachment; same shape as `image`.
    File,
    /// Opaque binary attachment; same shape as `image`.
    Binary,
    /// Any datatype this client does not interpret.
    #[serde(other)]
    Other,
}

impl Datatype {
    /// Wire name of the datatype.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Enumeration => "enum",
            Self::Multienum => "multienum",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::Image => "image",
            Self::File => "file",
            Self::Binary => "binary",
            Self::Other => "other",
        }
    }

    /// True for the attachment kinds (`image`, `file`, `binary`).
    #[must_use]
    pub const fn is_attachment(&self) -> bool {
        matches!(self, Self::Image | Self::File | Self::Binary)
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

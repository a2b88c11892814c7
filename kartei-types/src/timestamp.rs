//! Wire date and timestamp parsing.
//!
//! The API serializes calendar dates as `"YYYY-MM-DD"` and timestamps as
//! `"YYYY-MM-DD HH:MM:SS"` (no timezone; server wall time). A string that
//! does not match yields `None`, never an error: decoded records degrade
//! missing or malformed time values to null.

use chrono::{NaiveDate, NaiveDateTime};

/// Wire format of calendar dates.
pub const WIRE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Wire format of timestamps.
pub const WIRE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parses a wire date string; `None` when it is not a valid date.
#[must_use]
pub fn parse_wire_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, WIRE_DATE_FORMAT).ok()
}

/// Parses a wire timestamp string; `None` when it is not a valid timestamp.
#[must_use]
pub fn parse_wire_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, WIRE_TIMESTAMP_FORMAT).ok()
}

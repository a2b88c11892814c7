//! Canonical string rendering of property values.
//!
//! [`format_value`] underpins both instance labels and the aggregation
//! grouping key, so its output must stay deterministic: dates render as
//! `DD.MM.YYYY`, timestamps append ` HH:MM:SS`, multienum values join with
//! `", "`, null renders empty. Changing any rendering changes grouping
//! results.

use crate::value::PropertyValue;
use kartei_types::{Datatype, parse_wire_date, parse_wire_timestamp};
use serde_json::Value;

const DISPLAY_DATE_FORMAT: &str = "%d.%m.%Y";
const DISPLAY_TIMESTAMP_FORMAT: &str = "%d.%m.%Y %H:%M:%S";

/// Renders a decoded value under its declared datatype.
///
/// Deterministic and side-effect free. Invalid or absent values render as
/// the empty string, never as an error.
#[must_use]
pub fn format_value(value: &PropertyValue, datatype: Datatype) -> String {
    match datatype {
        Datatype::Date => format_date(value),
        Datatype::Timestamp => format_timestamp(value),
        Datatype::Multienum => format_multienum(value),
        _ => canonical(value),
    }
}

fn format_date(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Date(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        PropertyValue::Timestamp(ts) => ts.format(DISPLAY_DATE_FORMAT).to_string(),
        PropertyValue::Json(Value::String(text)) => reparse_date(text)
            .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn format_timestamp(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Timestamp(ts) => ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        PropertyValue::Date(date) => format!("{} 00:00:00", date.format(DISPLAY_DATE_FORMAT)),
        PropertyValue::Json(Value::String(text)) => match parse_wire_timestamp(text) {
            Some(ts) => ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
            None => parse_wire_date(text)
                .map(|date| format!("{} 00:00:00", date.format(DISPLAY_DATE_FORMAT)))
                .unwrap_or_default(),
        },
        _ => String::new(),
    }
}

fn format_multienum(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Json(Value::Array(items)) => {
            items.iter().map(json_text).collect::<Vec<_>>().join(", ")
        }
        PropertyValue::Null => String::new(),
        other => canonical(other),
    }
}

/// A date-valued string may arrive in either wire shape; timestamps lose
/// their time component.
fn reparse_date(text: &str) -> Option<chrono::NaiveDate> {
    parse_wire_date(text).or_else(|| parse_wire_timestamp(text).map(|ts| ts.date()))
}

/// Fallback rendering for values without a datatype-specific rule.
fn canonical(value: &PropertyValue) -> String {
    match value {
        PropertyValue::Null => String::new(),
        PropertyValue::Date(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        PropertyValue::Timestamp(ts) => ts.format(DISPLAY_TIMESTAMP_FORMAT).to_string(),
        PropertyValue::Attachment(att) => serde_json::to_string(att).unwrap_or_default(),
        PropertyValue::Json(json) => json_text(json),
    }
}

/// String form of a passthrough JSON value: scalars render bare, arrays
/// join their members with commas, objects render as JSON text.
fn json_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(json_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

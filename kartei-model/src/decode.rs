//! Decoding raw wire records into typed instances.
//!
//! A raw record keys property values by numeric property id and carries
//! dates, timestamps and some structured payloads as strings. Decoding
//! resolves every property the definition declares, applies its datatype
//! rule, re-keys the result by title and derives the display label. Decode
//! problems degrade to null values; they never fail the record.

use crate::format::format_value;
use crate::instance::{Instance, InstanceMeta, RawInstance};
use crate::schema::{Definition, PropertySpec};
use crate::value::{AttachmentValue, PropertyValue};
use kartei_types::{Datatype, InstanceId, parse_wire_date, parse_wire_timestamp};
use serde_json::Value;
use std::collections::HashMap;
use tracing::warn;

/// (type name, property title) combinations whose wire values are
/// JSON-encoded strings rather than plain scalars.
const JSON_ENCODED_PROPERTIES: [(&str, &str); 4] = [
    ("template", "value"),
    ("payment", "data"),
    ("email", "recipients"),
    ("email", "emailFields"),
];

fn carries_encoded_json(type_name: &str, title: &str) -> bool {
    JSON_ENCODED_PROPERTIES
        .iter()
        .any(|(t, p)| *t == type_name && *p == title)
}

/// Decodes a raw wire record into a ready [`Instance`].
///
/// `id` is the id the record was requested under (singular responses omit
/// their own). The definition must be the one for the record's type.
#[must_use]
pub fn decode_instance(id: InstanceId, raw: RawInstance, definition: &Definition) -> Instance {
    let meta = InstanceMeta {
        created: raw.meta.created.as_deref().and_then(parse_wire_timestamp),
        lastmodified: raw
            .meta
            .lastmodified
            .as_deref()
            .and_then(parse_wire_timestamp),
    };

    let mut properties = HashMap::with_capacity(definition.properties.len());
    for spec in &definition.properties {
        let value = match raw.properties.get(&spec.id) {
            Some(value) => decode_property(&raw.type_name, spec, value.clone()),
            // No wire entry under this id: the declared default, as-is.
            None => PropertyValue::from_raw(spec.default.clone()),
        };
        properties.insert(spec.title.clone(), value);
    }

    let label = compute_label(definition, &properties);

    Instance {
        ready: true,
        id,
        type_name: raw.type_name,
        readonly: raw.readonly,
        label,
        meta,
        properties,
        children: raw.children,
        links: raw.links,
        parents: raw.parents,
    }
}

fn decode_property(type_name: &str, spec: &PropertySpec, value: Value) -> PropertyValue {
    if carries_encoded_json(type_name, &spec.title) {
        return decode_embedded_json(type_name, spec, value);
    }
    match spec.datatype {
        Datatype::Date => match value.as_str().and_then(parse_wire_date) {
            Some(date) => PropertyValue::Date(date),
            None => PropertyValue::Null,
        },
        Datatype::Timestamp => match value.as_str().and_then(parse_wire_timestamp) {
            Some(ts) => PropertyValue::Timestamp(ts),
            None => PropertyValue::Null,
        },
        dt if dt.is_attachment() => decode_attachment(value),
        _ => PropertyValue::from_raw(value),
    }
}

fn decode_embedded_json(type_name: &str, spec: &PropertySpec, value: Value) -> PropertyValue {
    match value {
        Value::Null => PropertyValue::Null,
        Value::String(text) => match serde_json::from_str(&text) {
            Ok(parsed) => PropertyValue::Json(parsed),
            Err(e) => {
                warn!(
                    "Discarding malformed JSON payload in {}.{}: {}",
                    type_name, spec.title, e
                );
                PropertyValue::Null
            }
        },
        other => PropertyValue::Json(other),
    }
}

fn decode_attachment(value: Value) -> PropertyValue {
    let Value::Object(mut fields) = value else {
        return PropertyValue::Null;
    };
    let lastmodified = match fields.remove("lastmodified") {
        Some(Value::String(text)) => parse_wire_timestamp(&text),
        _ => None,
    };
    PropertyValue::Attachment(AttachmentValue {
        lastmodified,
        fields,
    })
}

/// Derives the display label: the non-empty formatted values of the
/// definition's label fields, joined by single spaces. Titles that name no
/// declared property are skipped.
#[must_use]
pub fn compute_label(
    definition: &Definition,
    properties: &HashMap<String, PropertyValue>,
) -> String {
    let parts: Vec<String> = definition
        .label_fields
        .iter()
        .filter_map(|title| {
            let spec = definition.property_by_title(title)?;
            let value = properties.get(title)?;
            let text = format_value(value, spec.datatype);
            (!text.is_empty()).then_some(text)
        })
        .collect();
    parts.join(" ")
}

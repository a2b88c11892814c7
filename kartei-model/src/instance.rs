use crate::value::PropertyValue;
use chrono::NaiveDateTime;
use kartei_types::{InstanceId, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parsed record metadata.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct InstanceMeta {
    pub created: Option<NaiveDateTime>,
    pub lastmodified: Option<NaiveDateTime>,
}

/// A decoded instance: property values keyed by title, label derived.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Instance {
    pub ready: bool,
    pub id: InstanceId,
    #[serde(rename = "type")]
    pub type_name: String,
    pub readonly: bool,
    pub label: String,
    pub meta: InstanceMeta,
    pub properties: HashMap<String, PropertyValue>,
    /// Child type name → ordered ids of related records.
    pub children: HashMap<String, Vec<InstanceId>>,
    /// Link category → ordered ids of related records.
    pub links: HashMap<String, Vec<InstanceId>>,
    pub parents: Option<Vec<InstanceId>>,
}

impl Instance {
    /// The empty, not-ready shape a record is cached under before its first
    /// load completes. Placeholders are readonly until decoded.
    #[must_use]
    pub fn placeholder(id: InstanceId) -> Self {
        Self {
            ready: false,
            id,
            type_name: String::new(),
            readonly: true,
            label: String::new(),
            meta: InstanceMeta::default(),
            properties: HashMap::new(),
            children: HashMap::new(),
            links: HashMap::new(),
            parents: None,
        }
    }
}

/// Wire metadata block, timestamps still as strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawMeta {
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub lastmodified: Option<String>,
}

/// A raw record as served by `object/{ids}`, properties keyed by numeric
/// property id.
///
/// Transient: deserialized, decoded into an [`Instance`], then dropped.
/// Singular responses may omit `id`; the batch fetcher stamps the requested
/// id before decoding.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawInstance {
    #[serde(default)]
    pub id: Option<InstanceId>,
    #[serde(default, rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub readonly: bool,
    #[serde(default)]
    pub meta: RawMeta,
    #[serde(default)]
    pub properties: HashMap<PropertyId, serde_json::Value>,
    #[serde(default)]
    pub children: HashMap<String, Vec<InstanceId>>,
    #[serde(default)]
    pub links: HashMap<String, Vec<InstanceId>>,
    #[serde(default)]
    pub parents: Option<Vec<InstanceId>>,
}

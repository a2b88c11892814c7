use kartei_types::{Datatype, PropertyId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Schema of one type name, as served by `definition/{type}`.
///
/// Every wire field is optional: absent fields keep their defaults and
/// unknown fields are ignored, so a schema deserializes against any server
/// version. `ready` is client cache state, not part of the payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definition {
    #[serde(skip)]
    pub ready: bool,
    /// Type names that may appear below this type in the record hierarchy.
    #[serde(default)]
    pub children: Vec<String>,
    /// Property titles whose values compose an instance's display label.
    #[serde(default, rename = "label")]
    pub label_fields: Vec<String>,
    /// Link category → target type name.
    #[serde(default)]
    pub links: HashMap<String, String>,
    /// Whether sibling order is server-maintained for this type.
    #[serde(default)]
    pub ordered: bool,
    /// Parent type name, absent for root types.
    #[serde(default)]
    pub parents: Option<String>,
    /// Display grouping of properties.
    #[serde(default)]
    pub categories: Vec<PropertyCategory>,
    /// Ordered property declarations.
    #[serde(default)]
    pub properties: Vec<PropertySpec>,
}

impl Definition {
    /// Looks up a property declaration by its title.
    #[must_use]
    pub fn property_by_title(&self, title: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.title == title)
    }
}

/// One property declaration inside a [`Definition`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertySpec {
    #[serde(default)]
    pub id: PropertyId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub datatype: Datatype,
    /// Target type hint for link-valued properties.
    #[serde(default, rename = "type")]
    pub target_type: Option<String>,
    /// Enum options payload, passed through opaquely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<serde_json::Value>,
    /// Declared default, substituted when a record carries no value.
    #[serde(default)]
    pub default: serde_json::Value,
}

/// Display grouping of properties inside a [`Definition`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PropertyCategory {
    #[serde(default)]
    pub id: u32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub properties: Vec<PropertyId>,
}

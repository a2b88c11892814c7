//! Grouping aggregations over fetched records.
//!
//! An aggregation pulls a set of records of one type through the record
//! cache, renders a chosen tuple of properties to display form, and groups
//! the records whose rendered tuples agree. The duplicate-detection screens
//! are built on this: two contacts with the same formatted name end up in
//! one group.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future;
use kartei_model::{format_value, Definition, Instance, PropertySpec};
use kartei_types::{InstanceId, PropertyId};
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use crate::definitions::DefinitionCache;
use crate::error::{CacheError, CacheResult};
use crate::instances::InstanceCache;

/// Key used by callers that keep only one aggregation at a time.
pub const DEFAULT_AGGREGATION_KEY: &str = "default";

/// Joins the rendered key parts of a group.
pub const GROUP_KEY_SEPARATOR: &str = "<#>";

struct AggregationSlot {
    ready: watch::Sender<bool>,
    groups: Vec<Vec<Instance>>,
}

impl AggregationSlot {
    fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self {
            ready,
            groups: Vec::new(),
        }
    }
}

/// Groups records that agree on a rendered tuple of property values.
///
/// Results are stored under a caller-chosen key so independent screens can
/// keep separate aggregations. Each `aggregate` call recomputes its key's
/// result from scratch.
///
/// The handle is cheap to clone; clones share one result store.
#[derive(Clone)]
pub struct Aggregator {
    instances: InstanceCache,
    definitions: DefinitionCache,
    slots: Arc<RwLock<HashMap<String, AggregationSlot>>>,
}

impl Aggregator {
    pub fn new(instances: InstanceCache, definitions: DefinitionCache) -> Self {
        Self {
            instances,
            definitions,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Fetches `instance_ids`, renders `property_ids` for each record, and
    /// groups records whose rendered tuples are identical.
    ///
    /// Records whose rendered parts are all empty are left out, and groups
    /// of a single record are dropped. Group order follows the first
    /// appearance of each tuple; record order within a group follows
    /// `instance_ids`. The result replaces whatever `key` held before.
    ///
    /// Every record must carry `type_name` and every property id must
    /// resolve to exactly one property of that type's schema; anything
    /// else fails the whole call.
    pub async fn aggregate(
        &self,
        instance_ids: &[InstanceId],
        type_name: &str,
        property_ids: &[PropertyId],
        key: &str,
    ) -> CacheResult<Vec<Vec<Instance>>> {
        self.reset(key);
        debug!(
            "Aggregating {} instances of {} under key {}",
            instance_ids.len(),
            type_name,
            key
        );

        let fetches = instance_ids.iter().map(|&id| self.instances.fetch(id));
        let records = future::try_join_all(fetches).await?;

        for record in &records {
            if record.type_name != type_name {
                return Err(CacheError::TypeMismatch {
                    id: record.id,
                    expected: type_name.to_string(),
                    found: record.type_name.clone(),
                });
            }
        }

        let definition = self.definitions.fetch(type_name).await?;
        let specs = property_ids
            .iter()
            .map(|&property_id| resolve_property(&definition, property_id))
            .collect::<CacheResult<Vec<_>>>()?;

        let mut order: Vec<String> = Vec::new();
        let mut buckets: HashMap<String, Vec<Instance>> = HashMap::new();
        for record in records {
            let parts: Vec<String> = specs
                .iter()
                .map(|spec| {
                    record
                        .properties
                        .get(&spec.title)
                        .map(|value| format_value(value, spec.datatype))
                        .unwrap_or_default()
                })
                .collect();
            if parts.iter().all(String::is_empty) {
                continue;
            }
            let group_key = parts.join(GROUP_KEY_SEPARATOR);
            if !buckets.contains_key(&group_key) {
                order.push(group_key.clone());
            }
            buckets.entry(group_key).or_default().push(record);
        }

        let groups: Vec<Vec<Instance>> = order
            .into_iter()
            .filter_map(|group_key| buckets.remove(&group_key))
            .filter(|group| group.len() > 1)
            .collect();

        self.store(key, groups.clone());
        Ok(groups)
    }

    /// True once the aggregation under `key` has a stored result.
    pub fn has_aggregated(&self, key: &str) -> bool {
        let mut slots = self.slots.write();
        *slot_entry(&mut slots, key).ready.borrow()
    }

    /// The stored groups for `key`; empty until an aggregation completes.
    pub fn get_aggregated(&self, key: &str) -> Vec<Vec<Instance>> {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, key).groups.clone()
    }

    /// Subscribes to the readiness of the aggregation under `key`.
    pub fn subscribe_aggregated(&self, key: &str) -> watch::Receiver<bool> {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, key).ready.subscribe()
    }

    /// Drops `key`'s stored result so readers see the recomputation as
    /// "not ready" while it runs.
    fn reset(&self, key: &str) {
        let mut slots = self.slots.write();
        let slot = slot_entry(&mut slots, key);
        slot.groups.clear();
        slot.ready.send_replace(false);
    }

    fn store(&self, key: &str, groups: Vec<Vec<Instance>>) {
        let mut slots = self.slots.write();
        let slot = slot_entry(&mut slots, key);
        slot.groups = groups;
        slot.ready.send_replace(true);
    }
}

fn resolve_property(
    definition: &Definition,
    property_id: PropertyId,
) -> CacheResult<&PropertySpec> {
    let mut matches = definition
        .properties
        .iter()
        .filter(|spec| spec.id == property_id);
    match (matches.next(), matches.next()) {
        (Some(spec), None) => Ok(spec),
        _ => Err(CacheError::UnknownProperty { property_id }),
    }
}

fn slot_entry<'a>(
    slots: &'a mut HashMap<String, AggregationSlot>,
    key: &str,
) -> &'a mut AggregationSlot {
    slots
        .entry(key.to_string())
        .or_insert_with(AggregationSlot::new)
}

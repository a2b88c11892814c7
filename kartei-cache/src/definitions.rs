//! Schema cache with coalesced loads.

use std::collections::HashMap;
use std::sync::Arc;

use kartei_api::ApiTransport;
use kartei_model::Definition;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::error::{CacheError, CacheResult};
use crate::state::{await_ready, LoadState, Slot};

/// Cache of record definitions, keyed by type name.
///
/// A definition is loaded at most once per load cycle: every `fetch` call
/// issued while a load is in flight suspends on the same request, and
/// callers arriving after completion get the cached copy. A failed load
/// leaves the slot retryable.
///
/// The handle is cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct DefinitionCache {
    transport: Arc<dyn ApiTransport>,
    slots: Arc<RwLock<HashMap<String, Slot<Definition>>>>,
}

impl DefinitionCache {
    pub fn new(transport: Arc<dyn ApiTransport>) -> Self {
        Self {
            transport,
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// True once the definition is cached. Never triggers a load.
    pub fn has(&self, type_name: &str) -> bool {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, type_name).state().is_ready()
    }

    /// Snapshot of the cached definition, ready or not.
    ///
    /// A type that was never loaded comes back as the empty placeholder
    /// with `ready` unset. Never triggers a load.
    pub fn get(&self, type_name: &str) -> Definition {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, type_name).value.clone()
    }

    /// Subscribes to the definition's load state without starting a load.
    pub fn subscribe(&self, type_name: &str) -> watch::Receiver<LoadState> {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, type_name).subscribe()
    }

    /// Returns the definition for `type_name`, loading it if needed.
    ///
    /// Concurrent callers share one request: whoever finds the slot idle
    /// becomes the initiator, everyone else waits on the slot's state.
    /// Waiters of a failed load get the failure; the slot then accepts a
    /// fresh load on the next call.
    pub async fn fetch(&self, type_name: &str) -> CacheResult<Definition> {
        let waiter = {
            let mut slots = self.slots.write();
            let slot = slot_entry(&mut slots, type_name);
            match slot.state() {
                LoadState::Ready => return Ok(slot.value.clone()),
                LoadState::Loading => Some(slot.subscribe()),
                LoadState::Idle | LoadState::Failed(_) => {
                    slot.set_state(LoadState::Loading);
                    None
                }
            }
        };

        match waiter {
            Some(mut rx) => match await_ready(&mut rx).await {
                Ok(()) => Ok(self.get(type_name)),
                Err(reason) => Err(CacheError::LoadFailed {
                    entity: format!("definition {type_name}"),
                    reason,
                }),
            },
            None => self.load(type_name).await,
        }
    }

    async fn load(&self, type_name: &str) -> CacheResult<Definition> {
        debug!("Loading definition for {}", type_name);
        let path = format!("definition/{}", urlencoding::encode(type_name));
        let payload = match self.transport.get(&path).await {
            Ok(payload) => payload,
            Err(e) => {
                self.fail(type_name, e.to_string());
                return Err(e.into());
            }
        };

        let mut definition: Definition = match serde_json::from_value(payload) {
            Ok(definition) => definition,
            Err(e) => {
                let reason = format!("unparsable definition payload: {e}");
                self.fail(type_name, reason.clone());
                return Err(CacheError::LoadFailed {
                    entity: format!("definition {type_name}"),
                    reason,
                });
            }
        };
        definition.ready = true;

        let mut slots = self.slots.write();
        let slot = slot_entry(&mut slots, type_name);
        slot.value = definition.clone();
        slot.set_state(LoadState::Ready);
        Ok(definition)
    }

    fn fail(&self, type_name: &str, reason: String) {
        warn!("Failed to load definition for {}: {}", type_name, reason);
        if let Some(slot) = self.slots.write().get_mut(type_name) {
            slot.set_state(LoadState::Failed(reason));
        }
    }
}

fn slot_entry<'a>(
    slots: &'a mut HashMap<String, Slot<Definition>>,
    type_name: &str,
) -> &'a mut Slot<Definition> {
    slots
        .entry(type_name.to_string())
        .or_insert_with(|| Slot::new(Definition::default()))
}

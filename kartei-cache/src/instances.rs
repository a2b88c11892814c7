//! Record cache with deferred, batched fetches.
//!
//! `fetch` never issues a request per id. New ids go onto a shared queue;
//! the first id queued in a quiet moment schedules a flush a moment later,
//! and every id requested in the meantime rides along in the same batch.
//! The flush drains the whole queue and splits it into requests of at most
//! [`InstanceCacheConfig::batch_limit`] ids.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future;
use kartei_api::ApiTransport;
use kartei_model::{decode_instance, Instance, RawInstance};
use kartei_types::InstanceId;
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::definitions::DefinitionCache;
use crate::error::{CacheError, CacheResult};
use crate::state::{await_ready, LoadState, Slot};

/// Configuration for the record cache's batching behavior.
#[derive(Debug, Clone)]
pub struct InstanceCacheConfig {
    /// Most ids fetched in one request.
    pub batch_limit: usize,
    /// How long a scheduled flush waits for more ids to pile up (ms).
    pub flush_delay_ms: u64,
}

impl Default for InstanceCacheConfig {
    fn default() -> Self {
        Self {
            batch_limit: 256,
            flush_delay_ms: 1,
        }
    }
}

#[derive(Default)]
struct FlushQueue {
    pending: Vec<InstanceId>,
    scheduled: bool,
}

/// Cache of records, keyed by numeric id, filled by batched fetches.
///
/// Concurrent `fetch` calls for one id share one slot and one load;
/// distinct ids requested around the same time share one request. Decoding
/// a fetched record suspends on the [`DefinitionCache`] for the record's
/// type, so a batch of one type costs a single definition load.
///
/// The handle is cheap to clone; clones share one cache.
#[derive(Clone)]
pub struct InstanceCache {
    transport: Arc<dyn ApiTransport>,
    definitions: DefinitionCache,
    config: InstanceCacheConfig,
    slots: Arc<RwLock<HashMap<InstanceId, Slot<Instance>>>>,
    queue: Arc<Mutex<FlushQueue>>,
}

impl InstanceCache {
    pub fn new(
        transport: Arc<dyn ApiTransport>,
        definitions: DefinitionCache,
        config: InstanceCacheConfig,
    ) -> Self {
        Self {
            transport,
            definitions,
            config,
            slots: Arc::new(RwLock::new(HashMap::new())),
            queue: Arc::new(Mutex::new(FlushQueue::default())),
        }
    }

    // ── Synchronous read surface ────────────────────────────────

    /// True once the record is cached. Never triggers a fetch.
    pub fn has(&self, id: InstanceId) -> bool {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, id).state().is_ready()
    }

    /// Snapshot of the cached record, ready or not.
    ///
    /// An id that was never loaded comes back as its placeholder with
    /// `ready` unset. Never triggers a fetch.
    pub fn get(&self, id: InstanceId) -> Instance {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, id).value.clone()
    }

    /// Subscribes to the record's load state without starting a fetch.
    pub fn subscribe(&self, id: InstanceId) -> watch::Receiver<LoadState> {
        let mut slots = self.slots.write();
        slot_entry(&mut slots, id).subscribe()
    }

    // ── Fetch pipeline ──────────────────────────────────────────

    /// Returns the record for `id`, fetching it if needed.
    ///
    /// The fetch is deferred so ids requested around the same time share
    /// one batched request. Only the caller that finds the slot idle puts
    /// the id on the queue; everyone else waits on the slot's state.
    pub async fn fetch(&self, id: InstanceId) -> CacheResult<Instance> {
        let (mut rx, initiate) = {
            let mut slots = self.slots.write();
            let slot = slot_entry(&mut slots, id);
            match slot.state() {
                LoadState::Ready => return Ok(slot.value.clone()),
                LoadState::Loading => (slot.subscribe(), false),
                LoadState::Idle | LoadState::Failed(_) => {
                    slot.set_state(LoadState::Loading);
                    (slot.subscribe(), true)
                }
            }
        };

        if initiate {
            self.enqueue(id);
        }

        match await_ready(&mut rx).await {
            Ok(()) => Ok(self.get(id)),
            Err(reason) => Err(CacheError::LoadFailed {
                entity: format!("instance {id}"),
                reason,
            }),
        }
    }

    fn enqueue(&self, id: InstanceId) {
        let spawn_flush = {
            let mut queue = self.queue.lock();
            queue.pending.push(id);
            !std::mem::replace(&mut queue.scheduled, true)
        };

        if spawn_flush {
            let cache = self.clone();
            tokio::spawn(async move { cache.flush().await });
        }
    }

    /// Drains the queue after a short grace period and loads everything
    /// on it, in chunks of at most `batch_limit` ids.
    async fn flush(self) {
        tokio::time::sleep(Duration::from_millis(self.config.flush_delay_ms)).await;

        let pending = {
            let mut queue = self.queue.lock();
            queue.scheduled = false;
            std::mem::take(&mut queue.pending)
        };
        if pending.is_empty() {
            return;
        }

        debug!("Flushing {} queued record fetches", pending.len());
        let batches = pending
            .chunks(self.config.batch_limit)
            .map(|chunk| self.load_batch(chunk.to_vec()));
        future::join_all(batches).await;
    }

    async fn load_batch(&self, ids: Vec<InstanceId>) {
        let records = match self.request_batch(&ids).await {
            Ok(records) => records,
            Err(e) => {
                let reason = e.to_string();
                for &id in &ids {
                    self.fail(id, reason.clone());
                }
                return;
            }
        };

        // Response order is not the request order: correlate by id.
        let mut by_id: HashMap<InstanceId, RawInstance> = HashMap::new();
        for raw in records {
            match raw.id {
                Some(id) => {
                    by_id.insert(id, raw);
                }
                None => warn!("Discarding batched record with no id"),
            }
        }

        let mut stores = Vec::with_capacity(ids.len());
        for &id in &ids {
            match by_id.remove(&id) {
                Some(raw) => stores.push(self.decode_and_store(id, raw)),
                None => self.fail(id, "missing from batched response".to_string()),
            }
        }
        for id in by_id.into_keys() {
            warn!("Discarding record {} nobody asked for", id);
        }
        future::join_all(stores).await;
    }

    async fn request_batch(&self, ids: &[InstanceId]) -> CacheResult<Vec<RawInstance>> {
        if let [id] = ids {
            let payload = self.transport.get(&format!("object/{id}")).await?;
            let mut raw: RawInstance =
                serde_json::from_value(payload).map_err(|e| CacheError::LoadFailed {
                    entity: format!("instance {id}"),
                    reason: format!("unparsable record payload: {e}"),
                })?;
            // Singular responses may omit the id; the request names it.
            raw.id = Some(*id);
            return Ok(vec![raw]);
        }

        let joined = ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let payload = self.transport.get(&format!("object/{joined}")).await?;
        serde_json::from_value(payload).map_err(|e| CacheError::LoadFailed {
            entity: format!("instances {joined}"),
            reason: format!("unparsable batch payload: {e}"),
        })
    }

    async fn decode_and_store(&self, id: InstanceId, raw: RawInstance) {
        let definition = match self.definitions.fetch(&raw.type_name).await {
            Ok(definition) => definition,
            Err(e) => {
                self.fail(id, format!("definition {} unavailable: {}", raw.type_name, e));
                return;
            }
        };

        let instance = decode_instance(id, raw, &definition);
        let mut slots = self.slots.write();
        if let Some(slot) = slots.get_mut(&id) {
            slot.value = instance;
            slot.set_state(LoadState::Ready);
        }
    }

    fn fail(&self, id: InstanceId, reason: String) {
        warn!("Failed to load instance {}: {}", id, reason);
        if let Some(slot) = self.slots.write().get_mut(&id) {
            slot.set_state(LoadState::Failed(reason));
        }
    }
}

fn slot_entry(
    slots: &mut HashMap<InstanceId, Slot<Instance>>,
    id: InstanceId,
) -> &mut Slot<Instance> {
    slots
        .entry(id)
        .or_insert_with(|| Slot::new(Instance::placeholder(id)))
}

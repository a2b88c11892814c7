//! Record and schema caches for Kartei.
//!
//! Everything the client renders is built from two kinds of data: records
//! ("instances") and the schemas that describe them ("definitions"). Both
//! are fetched lazily over the JSON API, cached for the session and shared
//! by every screen.
//!
//! ## Components
//!
//! - **DefinitionCache**: one coalesced load per type name
//! - **InstanceCache**: deferred, batched record fetches
//! - **Aggregator**: groups fetched records by rendered property values
//! - **LoadState**: per-entry lifecycle, broadcast on watch channels
//!
//! ## Fetch process
//!
//! 1. **Queue**: `fetch` marks the record's slot loading and queues its id
//! 2. **Flush**: a moment later, one batched request picks up every id
//!    queued in the meantime
//! 3. **Decode**: each returned record suspends on its type's definition,
//!    then becomes a typed, labeled instance
//! 4. **Broadcast**: the slot flips to `Ready` and every waiter resumes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use kartei_api::{ApiConfig, HttpTransport};
//! use kartei_cache::{Aggregator, DefinitionCache, InstanceCache, InstanceCacheConfig};
//!
//! let transport = Arc::new(HttpTransport::new(ApiConfig {
//!     base_url: "https://demo.kartei.app/api/1".to_string(),
//!     api_key: "my-api-key".to_string(),
//!     ..Default::default()
//! }));
//!
//! let definitions = DefinitionCache::new(transport.clone());
//! let instances = InstanceCache::new(
//!     transport,
//!     definitions.clone(),
//!     InstanceCacheConfig::default(),
//! );
//! let aggregator = Aggregator::new(instances, definitions);
//! # let _ = aggregator;
//! ```

pub mod aggregate;
pub mod definitions;
mod error;
pub mod instances;
pub mod state;

pub use aggregate::{Aggregator, DEFAULT_AGGREGATION_KEY, GROUP_KEY_SEPARATOR};
pub use definitions::DefinitionCache;
pub use error::{CacheError, CacheResult};
pub use instances::{InstanceCache, InstanceCacheConfig};
pub use state::LoadState;

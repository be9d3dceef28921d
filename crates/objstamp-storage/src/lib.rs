//! Object store access for Objstamp
//!
//! The webhook only needs two calls from the store: read an object's
//! metadata and patch it. [`ObjectStore`] is that seam.

pub mod gcs;
pub mod memory;

pub use gcs::GcsClient;
pub use memory::MemoryStore;

use async_trait::async_trait;
use objstamp_core::config::{StorageBackend, StorageConfig};
use objstamp_core::types::{MetadataPatch, ObjectMetadata};
use objstamp_core::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Object store trait
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch object metadata; `None` when the object does not exist
    async fn get_object(&self, bucket: &str, name: &str) -> Result<Option<ObjectMetadata>>;

    /// Metadata-only update of an existing object
    async fn patch_metadata(
        &self,
        bucket: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<ObjectMetadata>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Build the configured object store
pub fn from_config(config: &StorageConfig, timeout: Duration) -> Result<Arc<dyn ObjectStore>> {
    let store: Arc<dyn ObjectStore> = match config.backend {
        StorageBackend::Gcs => Arc::new(GcsClient::from_config(config, timeout)?),
        StorageBackend::Memory => Arc::new(MemoryStore::new()),
    };
    info!("Object store backend: {}", store.backend_name());
    Ok(store)
}

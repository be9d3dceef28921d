//! In-memory object store

use async_trait::async_trait;
use objstamp_core::types::{MetadataPatch, ObjectMetadata};
use objstamp_core::{Error, Result};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::RwLock;
use tracing::debug;

use crate::ObjectStore;

/// Object store backed by a map, counting every call
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<(String, String), ObjectMetadata>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, object: ObjectMetadata) {
        self.objects
            .write()
            .await
            .insert((object.bucket.clone(), object.name.clone()), object);
    }

    pub async fn remove(&self, bucket: &str, name: &str) {
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), name.to_string()));
    }

    pub async fn get(&self, bucket: &str, name: &str) -> Option<ObjectMetadata> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    /// Make every subsequent call fail with a 503
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Upstream {
                status: 503,
                message: "memory store marked unavailable".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get_object(&self, bucket: &str, name: &str) -> Result<Option<ObjectMetadata>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.get(bucket, name).await)
    }

    async fn patch_metadata(
        &self,
        bucket: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<ObjectMetadata> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let mut objects = self.objects.write().await;
        let object = objects
            .get_mut(&(bucket.to_string(), name.to_string()))
            .ok_or_else(|| Error::Upstream {
                status: 404,
                message: format!("No such object: {}/{}", bucket, name),
            })?;
        object.apply(patch);
        debug!("Patched {}/{} in memory", bucket, name);

        Ok(object.clone())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

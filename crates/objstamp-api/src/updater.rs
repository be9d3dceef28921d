//! Object metadata update

use objstamp_core::types::{MetadataPatch, ObjectNotification};
use objstamp_core::{Profile, Result};
use objstamp_storage::ObjectStore;
use std::time::Instant;
use tracing::info;

use crate::metrics;

/// How an update ended when nothing went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Metadata patched
    Updated,
    /// Object deleted or replaced before we got to it
    Missing,
    /// Cache-control already at the target value
    Unchanged,
}

impl UpdateOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOutcome::Updated => "updated",
            UpdateOutcome::Missing => "missing",
            UpdateOutcome::Unchanged => "unchanged",
        }
    }
}

/// Bring the object's metadata in line with `profile`
///
/// At most one read and one write against the store. Store failures are
/// returned to the caller untouched.
pub async fn update_object_metadata(
    store: &dyn ObjectStore,
    profile: Profile,
    notification: &ObjectNotification,
) -> Result<UpdateOutcome> {
    let bucket = notification.bucket.as_str();
    let name = notification.name.as_str();

    let started = Instant::now();
    let current = store.get_object(bucket, name).await;
    metrics::record_store_call("get", current.is_ok(), started.elapsed().as_secs_f64());

    let target = profile.resolve(name);

    let Some(current) = current? else {
        info!("Object does not exist: {}", name);
        return Ok(UpdateOutcome::Missing);
    };

    if profile.skips_unchanged()
        && current.cache_control.as_deref() == Some(target.cache_control.as_str())
    {
        info!(
            "Cache-control already set on {}/{}: {}",
            bucket, name, target.cache_control
        );
        return Ok(UpdateOutcome::Unchanged);
    }

    let patch = MetadataPatch {
        content_type: target.content_type,
        cache_control: Some(target.cache_control),
    };

    let started = Instant::now();
    let patched = store.patch_metadata(bucket, name, &patch).await;
    metrics::record_store_call("patch", patched.is_ok(), started.elapsed().as_secs_f64());
    patched?;

    info!("Successfully updated object: {}", name);
    Ok(UpdateOutcome::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use objstamp_core::types::ObjectMetadata;
    use objstamp_storage::MemoryStore;

    fn notification(name: &str) -> ObjectNotification {
        ObjectNotification::new("media", name)
    }

    #[tokio::test]
    async fn test_full_profile_sets_both_fields() {
        let store = MemoryStore::new();
        store
            .insert(ObjectMetadata::new("media", "index.html").with_content_type("application/octet-stream"))
            .await;

        let outcome = update_object_metadata(&store, Profile::Full, &notification("index.html"))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Updated);

        let object = store.get("media", "index.html").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("text/html"));
        assert_eq!(object.cache_control.as_deref(), Some("public, max-age=900"));
        assert_eq!(store.reads(), 1);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_full_profile_always_writes() {
        let store = MemoryStore::new();
        store
            .insert(
                ObjectMetadata::new("media", "a.png")
                    .with_content_type("image/png")
                    .with_cache_control("public, max-age=2592000"),
            )
            .await;

        update_object_metadata(&store, Profile::Full, &notification("a.png"))
            .await
            .unwrap();
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_cache_only_leaves_content_type() {
        let store = MemoryStore::new();
        store
            .insert(ObjectMetadata::new("media", "clip.mov").with_content_type("video/quicktime"))
            .await;

        update_object_metadata(&store, Profile::CacheOnly, &notification("clip.mov"))
            .await
            .unwrap();

        let object = store.get("media", "clip.mov").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("video/quicktime"));
        assert_eq!(object.cache_control.as_deref(), Some("public, max-age=2592000"));
    }

    #[tokio::test]
    async fn test_cache_only_is_idempotent() {
        let store = MemoryStore::new();
        store.insert(ObjectMetadata::new("media", "app.js")).await;

        let first = update_object_metadata(&store, Profile::CacheOnly, &notification("app.js"))
            .await
            .unwrap();
        let second = update_object_metadata(&store, Profile::CacheOnly, &notification("app.js"))
            .await
            .unwrap();

        assert_eq!(first, UpdateOutcome::Updated);
        assert_eq!(second, UpdateOutcome::Unchanged);
        assert_eq!(store.reads(), 2);
        assert_eq!(store.writes(), 1);
    }

    #[tokio::test]
    async fn test_missing_object_is_not_an_error() {
        let store = MemoryStore::new();

        let outcome = update_object_metadata(&store, Profile::Full, &notification("gone.png"))
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::Missing);
        assert_eq!(store.writes(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = MemoryStore::new();
        store.insert(ObjectMetadata::new("media", "a.png")).await;
        store.set_unavailable(true);

        let result = update_object_metadata(&store, Profile::Full, &notification("a.png")).await;
        assert!(result.is_err());
        assert_eq!(store.writes(), 0);
    }
}

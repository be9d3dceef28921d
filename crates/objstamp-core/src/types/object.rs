//! Object metadata types

use serde::{Deserialize, Serialize};

/// Object resource as reported by the store
///
/// Field names follow the GCS JSON API; integer fields arrive as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    pub name: String,
    pub bucket: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metageneration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl ObjectMetadata {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: bucket.into(),
            ..Default::default()
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    /// Apply a patch in place, bumping the metageneration
    pub fn apply(&mut self, patch: &MetadataPatch) {
        if let Some(content_type) = &patch.content_type {
            self.content_type = Some(content_type.clone());
        }
        if let Some(cache_control) = &patch.cache_control {
            self.cache_control = Some(cache_control.clone());
        }
        let next = self
            .metageneration
            .as_deref()
            .and_then(|m| m.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        self.metageneration = Some(next.to_string());
    }
}

/// Metadata-only mutation; unset fields are left untouched upstream
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

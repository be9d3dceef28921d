//! Metadata rules
//!
//! Pure lookups from an object name to the metadata it should carry.
//! Extensions are matched exactly and case-sensitively.

mod cache;
mod mime;

pub use cache::{CachePolicy, CacheTier, CACHE_ONLY_CACHE_POLICY, FULL_CACHE_POLICY};
pub use mime::MIME_TYPES;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rule set applied to finalized objects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    /// Sets content type and cache-control on every object from an
    /// allow-listed bucket.
    #[default]
    Full,
    /// Sets cache-control only, skipping objects that already carry the
    /// target value. No bucket allow-list.
    CacheOnly,
}

impl Profile {
    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Full => "full",
            Profile::CacheOnly => "cache-only",
        }
    }

    pub fn cache_policy(&self) -> &'static CachePolicy {
        match self {
            Profile::Full => &FULL_CACHE_POLICY,
            Profile::CacheOnly => &CACHE_ONLY_CACHE_POLICY,
        }
    }

    pub fn sets_content_type(&self) -> bool {
        matches!(self, Profile::Full)
    }

    pub fn enforces_allow_list(&self) -> bool {
        matches!(self, Profile::Full)
    }

    /// Whether an object already carrying the target cache-control is left alone
    pub fn skips_unchanged(&self) -> bool {
        matches!(self, Profile::CacheOnly)
    }

    /// Metadata this profile wants on `object_name`
    pub fn resolve(&self, object_name: &str) -> ResolvedMetadata {
        ResolvedMetadata {
            content_type: self
                .sets_content_type()
                .then(|| content_type(object_name).to_string()),
            cache_control: self.cache_policy().cache_control(object_name),
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s {
            "full" => Ok(Profile::Full),
            "cache-only" | "cache_only" => Ok(Profile::CacheOnly),
            other => Err(crate::Error::Config(format!("Unknown profile: {}", other))),
        }
    }
}

/// Target metadata for one object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMetadata {
    pub content_type: Option<String>,
    pub cache_control: String,
}

/// Extension of an object name: everything after the last `.`, or `""`.
pub fn extension(object_name: &str) -> &str {
    object_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .unwrap_or("")
}

/// MIME type for an extension, if the table knows it
pub fn lookup_content_type(ext: &str) -> Option<&'static str> {
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
}

/// Content type for an object name, falling back to `application/octet-stream`
pub fn content_type(object_name: &str) -> &'static str {
    lookup_content_type(extension(object_name)).unwrap_or(crate::DEFAULT_CONTENT_TYPE)
}

/// Cache-control value for an object name under `profile`
pub fn cache_control(object_name: &str, profile: Profile) -> String {
    profile.cache_policy().cache_control(object_name)
}

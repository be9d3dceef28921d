//! Cache-control tiers

use super::extension;

/// Extensions sharing one max-age
#[derive(Debug)]
pub struct CacheTier {
    pub extensions: &'static [&'static str],
    pub max_age_secs: u64,
}

/// Tiered max-age table with a fallback for unlisted extensions
#[derive(Debug)]
pub struct CachePolicy {
    pub default_max_age_secs: u64,
    /// Checked in order; the first tier listing the extension wins
    pub tiers: &'static [CacheTier],
}

/// 30 days
const LONG: u64 = 2_592_000;
/// 2 days
const ASSETS: u64 = 172_800;
/// 15 minutes
const SHORT: u64 = 900;

pub static FULL_CACHE_POLICY: CachePolicy = CachePolicy {
    default_max_age_secs: LONG,
    tiers: &[
        CacheTier {
            extensions: &["html", "xml", "json", "txt"],
            max_age_secs: SHORT,
        },
        CacheTier {
            extensions: &["js", "css"],
            max_age_secs: ASSETS,
        },
    ],
};

pub static CACHE_ONLY_CACHE_POLICY: CachePolicy = CachePolicy {
    default_max_age_secs: 3_600,
    tiers: &[
        CacheTier {
            extensions: &["jpg", "jpeg", "png", "webp", "mov", "ico"],
            max_age_secs: LONG,
        },
        CacheTier {
            extensions: &["js", "css"],
            max_age_secs: ASSETS,
        },
        CacheTier {
            extensions: &["xml", "json"],
            max_age_secs: SHORT,
        },
    ],
};

impl CachePolicy {
    /// Max-age for an extension, if one of the tiers lists it
    pub fn lookup(&self, ext: &str) -> Option<u64> {
        self.tiers
            .iter()
            .find(|tier| tier.extensions.iter().any(|known| *known == ext))
            .map(|tier| tier.max_age_secs)
    }

    pub fn max_age(&self, object_name: &str) -> u64 {
        self.lookup(extension(object_name))
            .unwrap_or(self.default_max_age_secs)
    }

    pub fn cache_control(&self, object_name: &str) -> String {
        format!("public, max-age={}", self.max_age(object_name))
    }
}

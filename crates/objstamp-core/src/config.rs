//! Configuration for Objstamp

use serde::{Deserialize, Serialize};

use crate::rules::Profile;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObjstampConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl ObjstampConfig {
    pub fn from_file(path: &str) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Overlay environment variables read through `var`. Values that do not
    /// parse are rejected rather than ignored.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> crate::Result<()> {
        // Cloud Run and most container platforms hand the port over as PORT
        if let Some(port) = var("PORT") {
            self.server.port = parse_port("PORT", &port)?;
        }
        if let Some(port) = var("OBJSTAMP_PORT") {
            self.server.port = parse_port("OBJSTAMP_PORT", &port)?;
        }
        if let Some(addr) = var("OBJSTAMP_BIND_ADDRESS") {
            self.server.bind_address = addr;
        }

        if let Some(profile) = var("OBJSTAMP_PROFILE") {
            self.rules.profile = profile.parse()?;
        }
        if let Some(buckets) = var("OBJSTAMP_SOURCE_BUCKETS") {
            self.rules.source_buckets = parse_list(&buckets);
        }

        if let Some(backend) = var("OBJSTAMP_STORAGE_BACKEND") {
            self.storage.backend = match backend.as_str() {
                "memory" => StorageBackend::Memory,
                "gcs" => StorageBackend::Gcs,
                other => {
                    return Err(crate::Error::Config(format!(
                        "Unknown storage backend in OBJSTAMP_STORAGE_BACKEND: {}",
                        other
                    )))
                }
            };
        }
        if let Some(endpoint) = var("OBJSTAMP_GCS_ENDPOINT") {
            self.storage.endpoint = endpoint;
        }
        if let Some(token) = var("OBJSTAMP_GCS_TOKEN") {
            self.storage.auth = StorageAuth::Static;
            self.storage.token = Some(token);
        }

        if let Some(level) = var("OBJSTAMP_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("OBJSTAMP_LOG_FORMAT") {
            self.logging.format = format;
        }

        if let Some(enabled) = var("OBJSTAMP_METRICS_ENABLED") {
            self.metrics.enabled = match enabled.as_str() {
                "true" | "1" => true,
                "false" | "0" => false,
                other => {
                    return Err(crate::Error::Config(format!(
                        "OBJSTAMP_METRICS_ENABLED must be true or false, got {}",
                        other
                    )))
                }
            };
        }

        Ok(())
    }

    pub fn validate(&self) -> crate::Result<()> {
        self.rules.validate()?;
        self.storage.validate()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

fn parse_port(key: &str, raw: &str) -> crate::Result<u16> {
    raw.trim()
        .parse()
        .map_err(|_| crate::Error::Config(format!("Invalid port in {}: {}", key, raw)))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Timeout applied to each object store call
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 30,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Which metadata is applied and to which buckets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub profile: Profile,
    /// Buckets whose objects are updated. Only consulted by profiles that
    /// enforce an allow-list.
    pub source_buckets: Vec<String>,
}

impl RulesConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.profile.enforces_allow_list() && self.source_buckets.is_empty() {
            return Err(crate::Error::Config(format!(
                "profile '{}' requires at least one source bucket",
                self.profile
            )));
        }
        Ok(())
    }

    /// Whether notifications from `bucket` should be acted upon
    pub fn allows_bucket(&self, bucket: &str) -> bool {
        !self.profile.enforces_allow_list() || self.source_buckets.iter().any(|b| b == bucket)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Gcs,
    /// In-process store, for local runs
    Memory,
}

/// Where the GCS client gets its bearer token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageAuth {
    /// GCE/Cloud Run metadata server
    #[default]
    MetadataServer,
    /// `storage.token`
    Static,
    /// No Authorization header (emulators)
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub endpoint: String,
    pub auth: StorageAuth,
    pub token: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Gcs,
            endpoint: crate::DEFAULT_GCS_ENDPOINT.to_string(),
            auth: StorageAuth::MetadataServer,
            token: None,
        }
    }
}

impl StorageConfig {
    pub fn validate(&self) -> crate::Result<()> {
        if self.backend == StorageBackend::Memory {
            return Ok(());
        }

        let endpoint = url::Url::parse(&self.endpoint).map_err(|e| {
            crate::Error::Config(format!("Invalid storage endpoint {}: {}", self.endpoint, e))
        })?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(crate::Error::Config(format!(
                "Storage endpoint must be http(s): {}",
                self.endpoint
            )));
        }

        if self.auth == StorageAuth::Static && self.token.as_deref().unwrap_or("").is_empty() {
            return Err(crate::Error::Config(
                "storage.auth is 'static' but storage.token is not set".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// `pretty` or `json`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder and serve `GET /metrics`
    pub enabled: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ObjstampConfig::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.rules.profile, Profile::Full);
        assert_eq!(config.storage.endpoint, "https://storage.googleapis.com");
        assert!(!config.metrics.enabled);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_full_profile_requires_allow_list() {
        let mut config = ObjstampConfig::default();
        assert!(config.validate().is_err());

        config.rules.source_buckets = vec!["assets".into()];
        assert!(config.validate().is_ok());

        config.rules.source_buckets.clear();
        config.rules.profile = Profile::CacheOnly;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_allows_bucket() {
        let rules = RulesConfig {
            profile: Profile::Full,
            source_buckets: vec!["site".into(), "media.site".into()],
        };
        assert!(rules.allows_bucket("site"));
        assert!(rules.allows_bucket("media.site"));
        assert!(!rules.allows_bucket("other"));

        let rules = RulesConfig {
            profile: Profile::CacheOnly,
            source_buckets: vec!["site".into()],
        };
        assert!(rules.allows_bucket("other"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 9090

[rules]
profile = "cache-only"

[storage]
endpoint = "http://localhost:4443"
auth = "none"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = ObjstampConfig::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.rules.profile, Profile::CacheOnly);
        assert_eq!(config.storage.auth, StorageAuth::None);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            ObjstampConfig::from_toml("[rules]\nprofile = \"media\""),
            Err(crate::Error::Config(_))
        ));
        assert!(ObjstampConfig::from_file("/nonexistent/objstamp.toml").is_err());
    }

    #[test]
    fn test_apply_env() {
        let vars: HashMap<&str, &str> = [
            ("PORT", "7000"),
            ("OBJSTAMP_PROFILE", "cache-only"),
            ("OBJSTAMP_SOURCE_BUCKETS", "a, b,,c"),
            ("OBJSTAMP_GCS_TOKEN", "ya29.token"),
            ("OBJSTAMP_STORAGE_BACKEND", "memory"),
            ("OBJSTAMP_METRICS_ENABLED", "true"),
        ]
        .into_iter()
        .collect();

        let mut config = ObjstampConfig::default();
        config
            .apply_env(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.server.port, 7000);
        assert_eq!(config.rules.profile, Profile::CacheOnly);
        assert_eq!(config.rules.source_buckets, vec!["a", "b", "c"]);
        assert_eq!(config.storage.auth, StorageAuth::Static);
        assert_eq!(config.storage.token.as_deref(), Some("ya29.token"));
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert!(config.metrics.enabled);
    }

    #[test]
    fn test_objstamp_port_wins_over_port() {
        let mut config = ObjstampConfig::default();
        config
            .apply_env(|key| match key {
                "PORT" => Some("7000".into()),
                "OBJSTAMP_PORT" => Some("7001".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.server.port, 7001);
    }

    #[test]
    fn test_apply_env_rejects_bad_values() {
        for (key, value) in [
            ("OBJSTAMP_PROFILE", "cacheonly"),
            ("OBJSTAMP_STORAGE_BACKEND", "Memory"),
            ("PORT", "80a"),
            ("OBJSTAMP_PORT", "70000"),
            ("OBJSTAMP_METRICS_ENABLED", "yes"),
        ] {
            let mut config = ObjstampConfig::default();
            let result = config.apply_env(|k| (k == key).then(|| value.to_string()));
            assert!(
                matches!(result, Err(crate::Error::Config(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }

        let mut config = ObjstampConfig::default();
        let _ = config.apply_env(|k| (k == "OBJSTAMP_PROFILE").then(|| "cacheonly".to_string()));
        assert_eq!(config.rules.profile, Profile::Full);
    }

    #[test]
    fn test_storage_validation() {
        let mut storage = StorageConfig {
            endpoint: "not a url".into(),
            ..Default::default()
        };
        assert!(storage.validate().is_err());

        storage.endpoint = "ftp://example.com".into();
        assert!(storage.validate().is_err());

        storage.endpoint = "https://storage.googleapis.com".into();
        storage.auth = StorageAuth::Static;
        assert!(storage.validate().is_err());

        storage.token = Some("t".into());
        assert!(storage.validate().is_ok());

        storage.backend = StorageBackend::Memory;
        storage.endpoint = "not a url".into();
        assert!(storage.validate().is_ok());
    }
}

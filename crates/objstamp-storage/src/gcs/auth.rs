//! Bearer tokens for the GCS JSON API

use objstamp_core::config::{StorageAuth, StorageConfig};
use objstamp_core::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

/// Default metadata server host on GCE and Cloud Run
const METADATA_HOST: &str = "metadata.google.internal";
const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/default/token";

/// Refresh this long before the server-reported expiry
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

pub(crate) struct CachedToken {
    value: String,
    expires_at: Instant,
}

pub(crate) enum TokenProvider {
    None,
    Static(String),
    MetadataServer {
        url: String,
        cached: RwLock<Option<CachedToken>>,
    },
}

impl TokenProvider {
    pub(crate) fn from_config(config: &StorageConfig) -> Result<Self> {
        match config.auth {
            StorageAuth::None => Ok(TokenProvider::None),
            StorageAuth::Static => {
                let token = config
                    .token
                    .clone()
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| Error::Config("storage.token is not set".into()))?;
                Ok(TokenProvider::Static(token))
            }
            StorageAuth::MetadataServer => {
                // Same override the Google client libraries honour
                let host = std::env::var("GCE_METADATA_HOST")
                    .unwrap_or_else(|_| METADATA_HOST.to_string());
                Ok(TokenProvider::metadata_server(format!("http://{}{}", host, TOKEN_PATH)))
            }
        }
    }

    pub(crate) fn metadata_server(url: String) -> Self {
        TokenProvider::MetadataServer {
            url,
            cached: RwLock::new(None),
        }
    }

    /// Token for the next request, or `None` when requests go unauthenticated
    pub(crate) async fn token(&self, http: &Client) -> Result<Option<String>> {
        match self {
            TokenProvider::None => Ok(None),
            TokenProvider::Static(token) => Ok(Some(token.clone())),
            TokenProvider::MetadataServer { url, cached } => {
                if let Some(token) = cached.read().await.as_ref() {
                    if token.expires_at > Instant::now() {
                        return Ok(Some(token.value.clone()));
                    }
                }

                let mut cached = cached.write().await;
                if let Some(token) = cached.as_ref() {
                    if token.expires_at > Instant::now() {
                        return Ok(Some(token.value.clone()));
                    }
                }

                let fresh = fetch_metadata_token(http, url).await?;
                let value = fresh.value.clone();
                *cached = Some(fresh);
                Ok(Some(value))
            }
        }
    }
}

async fn fetch_metadata_token(http: &Client, url: &str) -> Result<CachedToken> {
    let response = http
        .get(url)
        .header("Metadata-Flavor", "Google")
        .send()
        .await
        .map_err(|e| Error::Http(format!("metadata server: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(Error::Upstream {
            status: status.as_u16(),
            message: format!("metadata server: {}", message),
        });
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| Error::Decode(format!("metadata token: {}", e)))?;
    debug!("Fetched access token expiring in {}s", token.expires_in);

    let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
    Ok(CachedToken {
        value: token.access_token,
        expires_at: Instant::now() + lifetime,
    })
}

//! Google Cloud Storage JSON API client
//!
//! Only the two object calls the webhook needs:
//! `GET /storage/v1/b/{bucket}/o/{object}` and `PATCH` on the same path.

mod auth;

use async_trait::async_trait;
use objstamp_core::config::StorageConfig;
use objstamp_core::types::{MetadataPatch, ObjectMetadata};
use objstamp_core::{Error, Result};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::debug;

use crate::ObjectStore;
use auth::TokenProvider;

/// GCS client
pub struct GcsClient {
    http: Client,
    endpoint: String,
    tokens: TokenProvider,
}

impl GcsClient {
    pub fn from_config(config: &StorageConfig, timeout: Duration) -> Result<Self> {
        let tokens = TokenProvider::from_config(config)?;
        Self::build(&config.endpoint, tokens, timeout)
    }

    fn build(endpoint: &str, tokens: TokenProvider, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    /// Object names may contain `/`; they are encoded as a single path segment
    fn object_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/b/{}/o/{}",
            self.endpoint,
            urlencoding::encode(bucket),
            urlencoding::encode(name)
        )
    }

    async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        Ok(match self.tokens.token(&self.http).await? {
            Some(token) => request.bearer_auth(token),
            None => request,
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        self.authorize(request)
            .await?
            .send()
            .await
            .map_err(|e| Error::Http(e.to_string()))
    }
}

async fn upstream_error(response: Response) -> Error {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    Error::Upstream { status, message }
}

async fn parse_object(response: Response) -> Result<ObjectMetadata> {
    response
        .json::<ObjectMetadata>()
        .await
        .map_err(|e| Error::Decode(e.to_string()))
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn get_object(&self, bucket: &str, name: &str) -> Result<Option<ObjectMetadata>> {
        let url = self.object_url(bucket, name);
        debug!("GET {}", url);

        let response = self.send(self.http.get(&url)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => parse_object(response).await.map(Some),
            _ => Err(upstream_error(response).await),
        }
    }

    async fn patch_metadata(
        &self,
        bucket: &str,
        name: &str,
        patch: &MetadataPatch,
    ) -> Result<ObjectMetadata> {
        let url = self.object_url(bucket, name);
        debug!("PATCH {} {:?}", url, patch);

        let response = self.send(self.http.patch(&url).json(patch)).await?;
        if response.status().is_success() {
            parse_object(response).await
        } else {
            Err(upstream_error(response).await)
        }
    }

    fn backend_name(&self) -> &'static str {
        "gcs"
    }
}

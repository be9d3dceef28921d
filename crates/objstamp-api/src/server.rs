//! Webhook server implementation

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use objstamp_core::{config::ObjstampConfig, Result};
use objstamp_storage::ObjectStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::{DefaultMakeSpan, TraceLayer};
use tracing::info;

use crate::handler::NotificationHandler;
use crate::metrics::{metrics_handler, MetricsRecorder};
use crate::routes;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ObjstampConfig>,
    pub handler: NotificationHandler,
}

impl AppState {
    pub fn new(config: ObjstampConfig, store: Arc<dyn ObjectStore>) -> Self {
        let handler = NotificationHandler::new(config.rules.clone(), store);
        Self {
            config: Arc::new(config),
            handler,
        }
    }
}

/// Webhook server
pub struct WebhookServer {
    config: ObjstampConfig,
}

impl WebhookServer {
    pub fn new(config: ObjstampConfig) -> Self {
        Self { config }
    }

    pub async fn run(self) -> Result<()> {
        self.config.validate()?;

        let metrics = if self.config.metrics.enabled {
            let recorder = Arc::new(MetricsRecorder::install()?);
            info!("Prometheus metrics initialized");
            Some(recorder)
        } else {
            None
        };

        let timeout = Duration::from_secs(self.config.server.request_timeout_secs);
        let store = objstamp_storage::from_config(&self.config.storage, timeout)?;

        let addr = self.config.bind_addr();
        let state = AppState::new(self.config.clone(), store);
        let app = create_router(state, metrics);

        let listener = TcpListener::bind(&addr).await?;
        info!("Objstamp webhook listening on http://{}", addr);
        info!(
            "Profile: {}, source buckets: {:?}",
            self.config.rules.profile, self.config.rules.source_buckets
        );
        if self.config.metrics.enabled {
            info!("Prometheus metrics at http://{}/metrics", addr);
        }

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Objstamp webhook stopped");
        Ok(())
    }
}

/// Build the router: the webhook at `POST /`, plus `/metrics` when a recorder is given
pub fn create_router(state: AppState, metrics: Option<Arc<MetricsRecorder>>) -> Router {
    let body_limit = state.config.server.max_body_bytes;

    let mut router = Router::new()
        .route("/", post(routes::receive_notification))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if let Some(metrics) = metrics {
        router = router.merge(
            Router::new()
                .route("/metrics", get(metrics_handler))
                .with_state(metrics),
        );
    }

    router.layer(TraceLayer::new_for_http().make_span_with(DefaultMakeSpan::default()))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use http_body_util::BodyExt;
    use objstamp_core::types::ObjectMetadata;
    use objstamp_core::Profile;
    use objstamp_storage::MemoryStore;
    use serde_json::json;
    use tower::ServiceExt;

    fn test_app(store: Arc<MemoryStore>, profile: Profile) -> Router {
        let mut config = ObjstampConfig::default();
        config.rules.profile = profile;
        config.rules.source_buckets = vec!["site".into()];
        config.server.max_body_bytes = 4096;
        create_router(AppState::new(config, store), None)
    }

    fn post(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap()
    }

    fn finalize_body(bucket: &str, name: &str) -> String {
        json!({
            "message": {
                "data": STANDARD.encode(json!({"name": name, "bucket": bucket}).to_string()),
                "attributes": {"eventType": "OBJECT_FINALIZE"}
            }
        })
        .to_string()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_post_updates_metadata() {
        let store = Arc::new(MemoryStore::new());
        store.insert(ObjectMetadata::new("site", "index.html")).await;
        let app = test_app(store.clone(), Profile::Full);

        let response = app.oneshot(post(finalize_body("site", "index.html"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(routes::REQUEST_ID_HEADER));
        assert_eq!(body_text(response).await, "Metadata updated");

        let object = store.get("site", "index.html").await.unwrap();
        assert_eq!(object.content_type.as_deref(), Some("text/html"));
        assert_eq!(object.cache_control.as_deref(), Some("public, max-age=900"));
    }

    #[tokio::test]
    async fn test_empty_post() {
        let app = test_app(Arc::new(MemoryStore::new()), Profile::Full);

        let response = app.oneshot(post(Body::empty())).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            "Bad Request: No Pub/Sub message received"
        );
    }

    #[tokio::test]
    async fn test_malformed_base64() {
        let app = test_app(Arc::new(MemoryStore::new()), Profile::Full);
        let body = json!({
            "message": {"data": "!!not-base64!!", "attributes": {"eventType": "OBJECT_FINALIZE"}}
        })
        .to_string();

        let response = app.oneshot(post(body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_text(response).await,
            "Bad Request: Data property is not valid base64 encoded JSON"
        );
    }

    #[tokio::test]
    async fn test_store_failure() {
        let store = Arc::new(MemoryStore::new());
        store.set_unavailable(true);
        let app = test_app(store, Profile::CacheOnly);

        let response = app.oneshot(post(finalize_body("media", "a.png"))).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_text(response).await, "");
    }

    #[tokio::test]
    async fn test_only_post_is_routed() {
        let app = test_app(Arc::new(MemoryStore::new()), Profile::Full);

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_metrics_route_when_enabled() {
        let store = Arc::new(MemoryStore::new());
        store.insert(ObjectMetadata::new("site", "app.js")).await;
        let mut config = ObjstampConfig::default();
        config.rules.source_buckets = vec!["site".into()];
        let app = create_router(
            AppState::new(config, store),
            Some(crate::metrics::test_recorder()),
        );

        let response = app
            .clone()
            .oneshot(post(finalize_body("site", "app.js")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let output = body_text(response).await;
        assert!(output.contains("objstamp_notifications_total"));
        assert!(output.contains("objstamp_store_calls_total"));
    }

    #[tokio::test]
    async fn test_body_limit() {
        let app = test_app(Arc::new(MemoryStore::new()), Profile::Full);

        let response = app.oneshot(post(vec![b'x'; 8192])).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

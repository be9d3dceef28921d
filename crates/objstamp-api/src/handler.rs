//! Notification handler
//!
//! Turns one push body into one response. Client-input problems answer 400,
//! benign non-actions answer 200, and store failures answer 500 so that the
//! push subscription redelivers.

use axum::http::StatusCode;
use objstamp_core::config::RulesConfig;
use objstamp_core::decode::decode_push;
use objstamp_core::types::PushEvent;
use objstamp_storage::ObjectStore;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::updater::{update_object_metadata, UpdateOutcome};

pub const NO_ACTION_TAKEN: &str = "No action taken";
pub const METADATA_UPDATED: &str = "Metadata updated";

/// Where a request ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Rejected,
    IgnoredEvent,
    IgnoredBucket,
    Update(UpdateOutcome),
    Failed,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Rejected => "rejected",
            Outcome::IgnoredEvent => "ignored_event",
            Outcome::IgnoredBucket => "ignored_bucket",
            Outcome::Update(update) => update.as_str(),
            Outcome::Failed => "failed",
        }
    }
}

/// Status and body returned to the push subscription
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    pub status: StatusCode,
    pub body: String,
    pub outcome: Outcome,
}

impl HandlerResponse {
    fn new(status: StatusCode, body: impl Into<String>, outcome: Outcome) -> Self {
        Self {
            status,
            body: body.into(),
            outcome,
        }
    }
}

/// Stateless handler; everything it holds is shared read-only
#[derive(Clone)]
pub struct NotificationHandler {
    rules: Arc<RulesConfig>,
    store: Arc<dyn ObjectStore>,
}

impl NotificationHandler {
    pub fn new(rules: RulesConfig, store: Arc<dyn ObjectStore>) -> Self {
        Self {
            rules: Arc::new(rules),
            store,
        }
    }

    pub async fn handle(&self, body: &[u8]) -> HandlerResponse {
        let delivery = match decode_push(body) {
            Ok(delivery) => delivery,
            Err(e) => {
                warn!(code = e.code(), "Error: {}", e);
                let status =
                    StatusCode::from_u16(e.http_status()).unwrap_or(StatusCode::BAD_REQUEST);
                return HandlerResponse::new(status, e.response_body(), Outcome::Rejected);
            }
        };

        let notification = match delivery.event {
            PushEvent::Ignored { event_type } => {
                debug!(
                    "Ignoring unrelated Cloud Storage event type: {}",
                    event_type.as_deref().unwrap_or("<none>")
                );
                return HandlerResponse::new(StatusCode::OK, NO_ACTION_TAKEN, Outcome::IgnoredEvent);
            }
            PushEvent::Finalize(notification) => notification,
        };

        if !self.rules.allows_bucket(&notification.bucket) {
            info!("Ignoring event from bucket {}", notification.bucket);
            return HandlerResponse::new(StatusCode::OK, "", Outcome::IgnoredBucket);
        }

        info!(
            subscription = delivery.subscription.as_deref().unwrap_or(""),
            message_id = delivery.message_id.as_deref().unwrap_or(""),
            publish_time = ?delivery.publish_time,
            bucket = %notification.bucket,
            name = %notification.name,
            generation = notification.generation.as_deref().unwrap_or(""),
            uploaded_content_type = notification.content_type.as_deref().unwrap_or(""),
            uploaded_cache_control = notification.cache_control.as_deref().unwrap_or(""),
            "Object finalized"
        );

        match update_object_metadata(self.store.as_ref(), self.rules.profile, &notification).await
        {
            Ok(outcome) => {
                HandlerResponse::new(StatusCode::OK, METADATA_UPDATED, Outcome::Update(outcome))
            }
            Err(e) => {
                error!(code = e.code(), "Error: {}", e);
                HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR, "", Outcome::Failed)
            }
        }
    }
}

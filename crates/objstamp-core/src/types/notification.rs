//! Push delivery types
//!
//! A push subscription POSTs an envelope of the form
//! `{"message": {"data": <base64>, "attributes": {...}, "messageId": ...}, "subscription": ...}`
//! where `data` decodes to the store's JSON object resource.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Object named by a finalize notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectNotification {
    pub name: String,
    pub bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
}

impl ObjectNotification {
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bucket: bucket.into(),
            generation: None,
            content_type: None,
            cache_control: None,
        }
    }
}

/// What a delivery asks of the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// Any event other than object finalize
    Ignored { event_type: Option<String> },
    /// An object finished uploading
    Finalize(ObjectNotification),
}

/// A validated push delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushDelivery {
    pub subscription: Option<String>,
    pub message_id: Option<String>,
    pub publish_time: Option<DateTime<Utc>>,
    pub event: PushEvent,
}

impl PushDelivery {
    pub fn notification(&self) -> Option<&ObjectNotification> {
        match &self.event {
            PushEvent::Finalize(notification) => Some(notification),
            PushEvent::Ignored { .. } => None,
        }
    }
}

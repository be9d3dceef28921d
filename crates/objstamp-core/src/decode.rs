//! Push envelope decoding
//!
//! Validates a raw push body step by step. Each check short-circuits with the
//! client error the push subscription should see.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::types::{ObjectNotification, PushDelivery, PushEvent};
use crate::utils::{is_truthy, non_empty_str};
use crate::{Error, Result, OBJECT_FINALIZE};

/// Decode a raw request body into a push delivery
pub fn decode_push(body: &[u8]) -> Result<PushDelivery> {
    let envelope: Value = serde_json::from_slice(body).map_err(|_| Error::NoMessage)?;
    if !is_truthy(&envelope) {
        return Err(Error::NoMessage);
    }

    let message = envelope
        .as_object()
        .and_then(|envelope| envelope.get("message"))
        .ok_or(Error::InvalidMessageFormat)?;

    let (data, attributes) = split_message(message)?;

    let subscription = non_empty_str(&envelope, "subscription").map(str::to_string);
    let message_id = non_empty_str(message, "messageId").map(str::to_string);
    let publish_time = non_empty_str(message, "publishTime").and_then(parse_publish_time);

    let event = match attributes.get("eventType") {
        Some(Value::String(event_type)) if event_type == OBJECT_FINALIZE => {
            PushEvent::Finalize(decode_notification(data)?)
        }
        other => PushEvent::Ignored {
            event_type: other.map(|v| match v {
                Value::String(s) => s.clone(),
                v => v.to_string(),
            }),
        },
    };

    Ok(PushDelivery {
        subscription,
        message_id,
        publish_time,
        event,
    })
}

/// `data` must be truthy and `attributes` a non-empty mapping
fn split_message(message: &Value) -> Result<(&Value, &Map<String, Value>)> {
    let message = message.as_object().ok_or(Error::InvalidMessageFormat)?;

    let data = message
        .get("data")
        .filter(|data| is_truthy(data))
        .ok_or(Error::InvalidMessageFormat)?;

    let attributes = message
        .get("attributes")
        .and_then(Value::as_object)
        .filter(|attributes| !attributes.is_empty())
        .ok_or(Error::InvalidMessageFormat)?;

    Ok((data, attributes))
}

fn decode_notification(data: &Value) -> Result<ObjectNotification> {
    let encoded = data.as_str().ok_or(Error::InvalidPayload)?;
    let bytes = STANDARD.decode(encoded).map_err(|_| Error::InvalidPayload)?;
    let payload: Value = serde_json::from_slice(&bytes).map_err(|_| Error::InvalidPayload)?;

    let (name, bucket) = match (
        non_empty_str(&payload, "name"),
        non_empty_str(&payload, "bucket"),
    ) {
        (Some(name), Some(bucket)) => (name, bucket),
        _ => return Err(Error::MissingObjectFields),
    };

    Ok(ObjectNotification {
        name: name.to_string(),
        bucket: bucket.to_string(),
        generation: non_empty_str(&payload, "generation").map(str::to_string),
        content_type: non_empty_str(&payload, "contentType").map(str::to_string),
        cache_control: non_empty_str(&payload, "cacheControl").map(str::to_string),
    })
}

fn parse_publish_time(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

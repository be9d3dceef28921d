//! Webhook routes

use axum::{
    body::Body,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use objstamp_core::utils::generate_request_id;
use std::time::Instant;
use tracing::{info_span, Instrument};

use crate::metrics;
use crate::server::AppState;

pub const REQUEST_ID_HEADER: &str = "x-objstamp-request-id";

/// POST / - Receive a push delivery
pub async fn receive_notification(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    let request_id = generate_request_id();
    let started = Instant::now();

    let response = state
        .handler
        .handle(&body)
        .instrument(info_span!("notification", request_id = %request_id))
        .await;

    metrics::record_notification(
        response.outcome.as_str(),
        response.status.as_u16(),
        started.elapsed().as_secs_f64(),
    );

    text_response(response.status, response.body, &request_id)
}

fn text_response(status: StatusCode, body: String, request_id: &str) -> Response {
    let mut response = (status, Body::from(body)).into_response();
    response.headers_mut().insert(
        "content-type",
        http::HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    if let Ok(value) = http::HeaderValue::from_str(request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

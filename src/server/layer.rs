//! Compression stage for UIDL responses.
//!
//! Wraps the UIDL route: the inner handler produces the raw payload,
//! this stage buffers it, runs the selector, and writes the chosen
//! stream with an `X-Uidl-Encoding` header telling the client which
//! form it received.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::state::AppState;
use crate::client::ENCODING_HEADER;

/// Run the selector over the response of `next`
pub async fn compress_uidl(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    // Error and bodiless responses are passed through untouched
    if !carries_payload(response.status()) {
        return response;
    }

    let start = Instant::now();
    let (mut parts, body) = response.into_parts();

    let raw = match axum::body::to_bytes(body, state.config.max_body_size).await {
        Ok(bytes) => bytes.to_vec(),
        Err(e) => {
            state.stats.record_error();
            tracing::error!("Failed to buffer UIDL response: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Failed to buffer response: {e}"),
            );
        },
    };

    let selection = match state.selector.select(raw) {
        Ok(selection) => selection,
        Err(e) => {
            state.stats.record_error();
            tracing::error!("UIDL compression failed: {}", e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("Compression failed: {e}"),
            );
        },
    };

    state.stats.record_response(
        selection.form,
        selection.measurement.is_some(),
        selection.sent_bytes(),
        start.elapsed(),
    );

    parts.headers.remove(header::CONTENT_LENGTH);
    parts.headers.insert(
        ENCODING_HEADER,
        HeaderValue::from_static(selection.form.header_value()),
    );

    Response::from_parts(parts, Body::from(selection.into_body()))
}

fn carries_payload(status: StatusCode) -> bool {
    status.is_success() && status != StatusCode::NO_CONTENT && status != StatusCode::RESET_CONTENT
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(json!({
            "error": {
                "message": message,
                "type": "compression_error"
            }
        })),
    )
        .into_response()
}

use axum::{
    body::Bytes,
    extract::{Path, State},
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

use super::AppState;
use crate::{metrics::gather_metrics, router::Provider, Error};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

pub async fn metrics() -> String {
    gather_metrics()
}

/// SNS posts with `text/plain`, so the body is read raw and decoded here.
pub async fn receive_notification(
    State(state): State<Arc<AppState>>,
    Path(provider): Path<String>,
    body: Bytes,
) -> Response {
    let provider: Provider = match provider.parse() {
        Ok(provider) => provider,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e),
    };

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &Error::JsonDecode(e)),
    };

    match state.router.route(provider, &state.options, &payload).await {
        Ok(events) => {
            info!("Normalized {} notification into {} events", provider, events.len());
            (StatusCode::OK, Json(events)).into_response()
        }
        Err(e) => {
            error!("Error handling {} notification: {}", provider, e);
            error_response(StatusCode::UNPROCESSABLE_ENTITY, &e)
        }
    }
}

fn error_response(status: StatusCode, error: &Error) -> Response {
    (status, Json(json!({ "error": error.to_string() }))).into_response()
}

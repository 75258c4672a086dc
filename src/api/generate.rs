//! Image generation endpoint
//!
//! POST /api/generate-image - `{ "prompt": "..." }` in, `{ "image": "data:..." }` out

use std::any::Any;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use super::AppState;
use crate::relay::{ErrorKind, RelayError};

/// Build the generation router
pub fn router() -> Router<AppState> {
    Router::new().route("/api/generate-image", post(generate_image))
}

/// Generation request
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

/// Generation success response
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// Data URI of the generated image
    pub image: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// HTTP status for each failure kind
pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::ProviderUnreachable | ErrorKind::ProviderRejected | ErrorKind::EmptyResult => {
            StatusCode::BAD_GATEWAY
        }
        ErrorKind::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(kind: ErrorKind, details: Option<serde_json::Value>, expose: bool) -> Response {
    (
        status_for(kind),
        Json(ErrorResponse {
            error: kind.message().to_string(),
            kind: Some(kind),
            details: details.filter(|_| expose),
        }),
    )
        .into_response()
}

/// Generate an image from a prompt
async fn generate_image(
    State(state): State<AppState>,
    body: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let prompt = match body {
        Ok(Json(req)) => req.prompt,
        Err(rejection) => {
            warn!("Unreadable request body: {}", rejection);
            None
        }
    };

    match state.relay.generate(prompt.as_deref()).await {
        Ok(image) => Json(GenerateResponse {
            image: image.to_data_uri(),
        })
        .into_response(),
        Err(e) => {
            let details = e.provider_detail();
            if !matches!(e, RelayError::InvalidInput) {
                warn!("Returning {} to client: {}", status_for(e.kind()), e);
            }
            error_response(e.kind(), details, state.expose_error_details)
        }
    }
}

/// Turn a handler panic into an internal error envelope
pub fn panic_response(panic: Box<dyn Any + Send + 'static>, expose: bool) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    error!("Handler panicked: {}", detail);

    error_response(
        ErrorKind::InternalError,
        Some(serde_json::Value::String(detail)),
        expose,
    )
}

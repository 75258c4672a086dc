//! Cross-origin boundary
//!
//! Browsers may only call the relay from the configured origins, and only
//! with GET or POST. Requests without an `Origin` header are not browser
//! cross-origin calls and pass through untouched.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::warn;

use super::ErrorResponse;

/// Methods the relay accepts from browsers
pub const ALLOWED_METHODS: [Method; 2] = [Method::GET, Method::POST];

/// Static origin allow-list
#[derive(Debug, Clone)]
pub struct AllowedOrigins {
    origins: Vec<HeaderValue>,
}

impl AllowedOrigins {
    /// Parse configured origins into header values
    pub fn new<S: AsRef<str>>(origins: &[S]) -> Result<Self, header::InvalidHeaderValue> {
        let origins = origins
            .iter()
            .map(|o| HeaderValue::from_str(o.as_ref().trim_end_matches('/')))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { origins })
    }

    /// Check an `Origin` header against the list
    pub fn allows(&self, origin: &HeaderValue) -> bool {
        self.origins.iter().any(|o| o == origin)
    }
}

/// CORS response headers for allowed origins
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.origins.iter().cloned()))
        .allow_methods(ALLOWED_METHODS)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

fn forbidden(reason: &str) -> Response {
    (
        StatusCode::FORBIDDEN,
        Json(ErrorResponse {
            error: reason.to_string(),
            kind: None,
            details: None,
        }),
    )
        .into_response()
}

/// Reject disallowed origins and preflights for disallowed methods
pub async fn origin_guard(
    State(origins): State<Arc<AllowedOrigins>>,
    request: Request,
    next: Next,
) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        if !origins.allows(origin) {
            warn!("Rejected request from origin {:?}", origin);
            return forbidden("Origin not allowed");
        }

        if request.method() == Method::OPTIONS {
            if let Some(requested) = request.headers().get(header::ACCESS_CONTROL_REQUEST_METHOD) {
                let allowed = ALLOWED_METHODS
                    .iter()
                    .any(|m| m.as_str().as_bytes() == requested.as_bytes());
                if !allowed {
                    warn!("Rejected preflight for method {:?}", requested);
                    return forbidden("Method not allowed");
                }
            }
        }
    }

    next.run(request).await
}

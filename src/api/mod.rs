//! HTTP API module - relay endpoint, health and cross-origin boundary

mod cors;
mod generate;

use std::any::Any;
use std::sync::Arc;

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::relay::Relay;
pub use cors::AllowedOrigins;
pub use generate::{ErrorResponse, GenerateRequest, GenerateResponse};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
    pub expose_error_details: bool,
}

/// Build the API router
pub fn router(state: AppState, origins: AllowedOrigins) -> Router {
    let expose = state.expose_error_details;
    let routes = Router::new()
        .route("/health", get(health_check))
        .route("/", get(root))
        .merge(generate::router());

    with_layers(routes, origins, expose).with_state(state)
}

/// Wrap routes in the panic, CORS, origin and trace layers
///
/// Layers run outermost-last: the trace layer sees every request, and a
/// panicking handler still answers through the CORS layer.
fn with_layers<S>(routes: Router<S>, origins: AllowedOrigins, expose: bool) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let origins = Arc::new(origins);

    routes
        .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
            generate::panic_response(panic, expose)
        }))
        .layer(cors::cors_layer(&origins))
        .layer(middleware::from_fn_with_state(origins, cors::origin_guard))
        .layer(TraceLayer::new_for_http())
}

/// Root endpoint
async fn root() -> impl IntoResponse {
    Json(RootResponse {
        name: "themis",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
struct RootResponse {
    name: &'static str,
    version: &'static str,
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        provider: if state.relay.is_configured() {
            "configured"
        } else {
            "unconfigured"
        },
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    provider: &'static str,
}

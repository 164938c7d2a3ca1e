//! # Meridian Admin API
//!
//! REST server for the multi-channel back-office.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Admin API                                       │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  TraceLayer    │  │  CorsLayer     │  │  /health                   ││
//! │  └───────┬────────┘  └───────┬────────┘  └────────────────────────────┘│
//! │          └─────────┬─────────┘                                          │
//! │                    ▼                                                    │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  /api/v1                                                          │  │
//! │  │                                                                   │  │
//! │  │  login  users  products  inventory  sales-channels  sales-orders │  │
//! │  │  suppliers  logistics  order-sync  communication  dashboard      │  │
//! │  └───────┬──────────────────────────────────────────────────────────┘  │
//! │          │ CurrentUser / AdminUser / ContactUser (JWT bearer)           │
//! │          ▼                                                              │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  meridian-db repositories ──► SQLite                              │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! See [`config`]. `RUST_LOG` controls log output.

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
pub mod state;

use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// The complete application: resource routes under the configured prefix,
/// `/health` at the root, request tracing and CORS.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.backend_cors_origins);

    Router::new()
        .nest(&state.config.api_v1_str, routes::api_router())
        .route("/health", get(routes::health::health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// No origins configured means no cross-origin access.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(Any)
}

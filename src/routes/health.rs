// src/routes/health.rs
//! API health check endpoint for the weather logging backend.
//!
//! This module defines the `/health` route used by container orchestrators
//! and CI pipelines to verify that the service is up. It is a sibling module
//! in the `routes` directory and follows the Explicit Module Boundary Pattern
//! (EMBP): the gateway (`mod.rs`) merges the subrouter, so the binary does not
//! need to know about individual endpoints.

use axum::{routing::get, Json, Router};
use serde::Serialize;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

/// Handle `GET /health`.
///
/// Deliberately lightweight: does not touch the record store.
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Subrouter with the single, unauthenticated `GET /health` route.
///
/// Generic over the application state so it merges into any gateway router.
pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/health", get(health))
}

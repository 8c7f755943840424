//! HTTP gateway (Axum) for interactive address matching.
//!
//! This module is primarily used by the `addrmatch serve` subcommand.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{MatchRequest, MatchResponse, match_handler};
pub use state::HandlerState;

use crate::matcher::PairScorer;
use crate::session::SessionSummary;

pub const STATUS_HEADER: &str = "X-Addrmatch-Status";
pub const STATUS_HEALTHY: &str = "healthy";
pub const STATUS_READY: &str = "ready";

pub fn create_router_with_state<S>(state: HandlerState<S>) -> Router
where
    S: PairScorer + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<S>))
        .route("/v1/match", post(match_handler::<S>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub session: &'static str,
    pub catalog: &'static str,
    pub summary: SessionSummary,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_HEALTHY));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

/// The session is fully loaded before the router exists, so readiness only
/// reports what was loaded. An empty catalog is flagged but still ready.
#[tracing::instrument(skip(state))]
pub async fn ready_handler<S>(State(state): State<HandlerState<S>>) -> Response
where
    S: PairScorer + 'static,
{
    let summary = state.session.summary();
    let catalog = if summary.catalog_entries == 0 {
        "empty"
    } else {
        STATUS_READY
    };

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(STATUS_READY));

    (
        StatusCode::OK,
        headers,
        Json(ReadyResponse {
            status: "ok",
            components: ComponentStatus {
                http: STATUS_READY,
                session: STATUS_READY,
                catalog,
                summary,
            },
        }),
    )
        .into_response()
}

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use super::STATUS_HEADER;
use super::error::GatewayError;
use super::state::HandlerState;
use crate::matcher::{MatchOutcome, PairScorer};

#[derive(Debug, Deserialize)]
pub struct MatchRequest {
    pub query: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MatchResponse {
    /// `matched`, `no_match` or `empty_input`.
    pub status: String,
    pub candidate: Option<String>,
    pub score: Option<f32>,
    /// Human-readable result, score to four decimals.
    pub message: String,
}

impl From<&MatchOutcome> for MatchResponse {
    fn from(outcome: &MatchOutcome) -> Self {
        Self {
            status: outcome.status().to_string(),
            candidate: outcome.best().map(|b| b.candidate.clone()),
            score: outcome.score(),
            message: outcome.to_string(),
        }
    }
}

/// Runs the catalog scan on the blocking pool under the configured timeout.
///
/// On timeout the scan's cancel flag is raised so the worker stops at the next
/// candidate instead of running to completion.
#[instrument(skip(state, request), fields(query_len = tracing::field::Empty))]
pub async fn match_handler<S>(
    State(state): State<HandlerState<S>>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError>
where
    S: PairScorer + 'static,
{
    let request: MatchRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    tracing::Span::current().record("query_len", request.query.chars().count());

    let cancel = Arc::new(AtomicBool::new(false));
    let task = {
        let session = Arc::clone(&state.session);
        let cancel = Arc::clone(&cancel);
        let query = request.query;
        tokio::task::spawn_blocking(move || session.match_query_cancellable(&query, &cancel))
    };

    let outcome = match tokio::time::timeout(state.match_timeout, task).await {
        Ok(joined) => joined.map_err(|e| GatewayError::InternalError(e.to_string()))??,
        Err(_) => {
            cancel.store(true, Ordering::Release);
            warn!(
                timeout_ms = state.match_timeout.as_millis() as u64,
                "Match timed out, cancelling scan"
            );
            return Err(GatewayError::Timeout(state.match_timeout));
        }
    };

    match &outcome {
        MatchOutcome::Match(best) => info!(score = best.score, "Match served"),
        other => debug!(status = other.status(), "No candidate served"),
    }

    let mut headers = HeaderMap::new();
    headers.insert(STATUS_HEADER, HeaderValue::from_static(outcome.status()));

    Ok((StatusCode::OK, headers, Json(MatchResponse::from(&outcome))).into_response())
}

use std::time::Duration;

use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::STATUS_HEADER;
use crate::matcher::MatchError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("match failed: {0}")]
    MatchFailed(#[from] MatchError),

    #[error("match timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, match_status) = match &self {
            GatewayError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, "invalid_request"),
            GatewayError::MatchFailed(MatchError::Cancelled { .. }) => {
                (StatusCode::SERVICE_UNAVAILABLE, "cancelled")
            }
            GatewayError::MatchFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "match_error"),
            GatewayError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "timeout"),
            GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        let mut headers = HeaderMap::new();
        headers.insert(STATUS_HEADER, HeaderValue::from_static(match_status));

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}

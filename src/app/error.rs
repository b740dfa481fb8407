use crate::utils::error::IngestError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// Request failures as seen by gateway callers.
#[derive(Debug)]
pub enum ApiError {
    /// The `x-pretino-key` header is missing.
    MissingApiKey,
    /// The presented key is not configured.
    InvalidApiKey,
    /// The key is valid but may not read full orders.
    UnprivilegedApiKey,
    /// Pretix answered with an error status or an unreadable page.
    Upstream(IngestError),
}

impl From<IngestError> for ApiError {
    fn from(error: IngestError) -> Self {
        Self::Upstream(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::MissingApiKey => (StatusCode::FORBIDDEN, "Not authenticated"),
            Self::InvalidApiKey => (StatusCode::UNAUTHORIZED, "Invalid API key"),
            Self::UnprivilegedApiKey => (StatusCode::UNAUTHORIZED, "Unprivileged API key"),
            Self::Upstream(e) => {
                tracing::error!("Order download failed: {}", e);
                (StatusCode::BAD_GATEWAY, "Upstream request failed")
            }
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

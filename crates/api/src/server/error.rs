//! Mapping from domain errors to HTTP responses

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mes_domain::{ErrorEnvelope, MesError};

/// Domain error rendered as `{ "error": <message> }` with a matching status.
#[derive(Debug)]
pub struct ApiError(pub MesError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            MesError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            MesError::Auth(_) => StatusCode::UNAUTHORIZED,
            MesError::Conflict(_) => StatusCode::CONFLICT,
            MesError::Network(_) => StatusCode::BAD_GATEWAY,
            MesError::Config(_)
            | MesError::Database(_)
            | MesError::NotFound(_)
            | MesError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<MesError> for ApiError {
    fn from(err: MesError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        }
        (status, Json(ErrorEnvelope::new(self.0.message()))).into_response()
    }
}

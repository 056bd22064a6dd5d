//! Mapping of domain errors onto HTTP

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::{error, warn};
use wastewise_domain::DomainError;

/// HTTP status for a domain error
pub fn status_for(err: &DomainError) -> StatusCode {
    match err {
        DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::DuplicateName { .. }
        | DomainError::NoChangesDetected { .. }
        | DomainError::IdentifierTaken { .. } => StatusCode::CONFLICT,
        DomainError::Blocked { .. } | DomainError::InvalidDetails { .. } => {
            StatusCode::BAD_REQUEST
        }
        DomainError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::StorageFailure(_) | DomainError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message safe to show a client
///
/// Faults keep their detail in the logs only.
pub fn client_message(err: &DomainError) -> String {
    if err.is_business_outcome() {
        err.to_string()
    } else {
        "An unexpected error occurred".to_string()
    }
}

/// Error half of the `{ message, data }` envelope
#[derive(Debug, Serialize)]
struct ErrorBody {
    message: String,
    /// Ids blocking a zone delete, otherwise null
    data: Option<Vec<String>>,
}

/// Handler error wrapping a [`DomainError`]
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if self.0.is_business_outcome() {
            warn!(status = %status, error = %self.0, "Request rejected");
        } else {
            error!(status = %status, error = ?self.0, "Request failed");
        }

        let body = ErrorBody {
            message: client_message(&self.0),
            data: match self.0 {
                DomainError::Blocked { dependents, .. } => Some(dependents),
                _ => None,
            },
        };
        (status, Json(body)).into_response()
    }
}

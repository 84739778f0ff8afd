use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use powerblockade_domain::DomainError;
use serde_json::json;
use tracing::error;

/// HTTP-facing error wrapper. Auth failures never leak which half failed
/// beyond the 401 itself; internal errors never leak details.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            DomainError::AuthMissing => (StatusCode::UNAUTHORIZED, "Missing node API key".to_string()),
            DomainError::AuthInvalid => (StatusCode::UNAUTHORIZED, "Invalid node API key".to_string()),
            DomainError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            DomainError::PrimaryNodeProtected => {
                (StatusCode::BAD_REQUEST, self.0.to_string())
            }
            DomainError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            DomainError::NotFound(_) | DomainError::NodeNotFound(_) => {
                (StatusCode::NOT_FOUND, self.0.to_string())
            }
            other => {
                error!(error = %other, "Request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

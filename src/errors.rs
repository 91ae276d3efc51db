use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::error::DbErr;
use serde::{Deserialize, Serialize};

fn current_request_path() -> Option<String> {
    crate::tracing::current_request_path()
}

/// Uniform error body returned by every endpoint.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// HTTP status category (e.g., "Not Found", "Conflict")
    pub error: String,
    /// Human-readable error description
    pub message: String,
    /// Request path that produced the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Field-level validation errors, when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] DbErr),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock: {0}")]
    InsufficientStock(String),

    #[error("Invalid bid: {0}")]
    InvalidBid(String),

    #[error("Vendor not eligible: {0}")]
    VendorNotEligible(String),

    #[error("Duplicate bid: {0}")]
    DuplicateBid(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("Other error: {0}")]
    Other(#[from] anyhow::Error),
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(err: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(err.to_string())
    }
}

impl ServiceError {
    /// Returns the HTTP status code for this error.
    /// Single source of truth for error-to-status mapping.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::ValidationError(_) | Self::InvalidBid(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) | Self::DuplicateBid(_) => StatusCode::CONFLICT,
            Self::InsufficientStock(_) | Self::VendorNotEligible(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::DatabaseError(_) | Self::InternalError(_) | Self::Other(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error message suitable for HTTP responses.
    /// Internal errors return generic messages to avoid leaking implementation details.
    pub fn response_message(&self) -> String {
        match self {
            Self::DatabaseError(err) => match conflict_message(err) {
                Some(msg) => msg,
                None => "Database error".to_string(),
            },
            Self::InternalError(_) | Self::Other(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }

    /// Effective status after constraint-violation translation.
    fn effective_status(&self) -> StatusCode {
        if let Self::DatabaseError(err) = self {
            if conflict_message(err).is_some() {
                return StatusCode::CONFLICT;
            }
        }
        self.status_code()
    }
}

/// Pattern-matches storage-layer unique-index violations into human-readable
/// Conflict messages so raw SQL text never reaches the client.
fn conflict_message(err: &DbErr) -> Option<String> {
    let text = err.to_string();
    let lowered = text.to_lowercase();
    if !lowered.contains("unique") && !lowered.contains("duplicate") {
        return None;
    }
    let field = if lowered.contains("email") {
        "Email"
    } else if lowered.contains("gst") {
        "GST number"
    } else if lowered.contains("license") {
        "License number"
    } else if lowered.contains("store") {
        "Store"
    } else {
        "Value"
    };
    Some(format!("{} already exists", field))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.effective_status();
        let err = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message: self.response_message(),
            path: current_request_path(),
            errors: None,
        };

        (status, Json(err)).into_response()
    }
}

/// API error type used at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Service error: {0}")]
    ServiceError(#[from] ServiceError),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::ServiceError(service_error) => (
                service_error.effective_status(),
                service_error.response_message(),
            ),
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            path: current_request_path(),
            errors: None,
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_status_code_mapping() {
        assert_eq!(
            ServiceError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::ValidationError("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ServiceError::Forbidden("x".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ServiceError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::InsufficientStock("x".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ServiceError::InvalidBid("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::DuplicateBid("x".into()).status_code(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn unique_violations_translate_to_conflict() {
        let err = DbErr::Custom("UNIQUE constraint failed: vendors.email".to_string());
        let service_err = ServiceError::DatabaseError(err);
        assert_eq!(service_err.effective_status(), StatusCode::CONFLICT);
        assert_eq!(service_err.response_message(), "Email already exists");
    }

    #[test]
    fn plain_database_errors_stay_internal() {
        let err = DbErr::Custom("connection reset".to_string());
        let service_err = ServiceError::DatabaseError(err);
        assert_eq!(
            service_err.effective_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(service_err.response_message(), "Database error");
    }
}

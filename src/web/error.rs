//! API error handling.

use axum::{
    http::{header::WWW_AUTHENTICATE, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

use crate::BdeError;

/// API error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// No bearer token was sent (401).
    AuthenticationRequired,
    /// Credentials or token rejected (401).
    AuthenticationFailed,
    /// Forbidden (403).
    Forbidden,
    /// Not found (404).
    NotFound,
    /// Natural key already taken (400).
    Duplicate,
    /// Validation error (422), malformed bodies included.
    ValidationError,
    /// Internal server error (500).
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            ErrorCode::AuthenticationFailed => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Duplicate => StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    /// Human-readable message.
    pub detail: String,
    /// Error code.
    pub code: ErrorCode,
    /// Field-level validation errors (only present for validation errors).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, Vec<String>>>,
}

/// API error type.
#[derive(Debug)]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    fields: Option<HashMap<String, Vec<String>>>,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            fields: None,
        }
    }

    /// Error code of this error.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a not found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    /// Create a validation error without field details.
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationError, message)
    }

    /// Create an internal server error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Create a validation error with field-level details.
    pub fn validation(fields: HashMap<String, Vec<String>>) -> Self {
        Self {
            code: ErrorCode::ValidationError,
            message: "Validation failed".to_string(),
            fields: Some(fields),
        }
    }

    /// Create a validation error from validator::ValidationErrors.
    pub fn from_validation_errors(errors: validator::ValidationErrors) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();

        for (field, field_errors) in errors.field_errors() {
            let messages: Vec<String> = field_errors
                .iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid value for {}", field))
                })
                .collect();
            fields.insert(field.to_string(), messages);
        }

        Self::validation(fields)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.code.status_code();
        let challenge = matches!(
            self.code,
            ErrorCode::AuthenticationRequired | ErrorCode::AuthenticationFailed
        );
        let body = Json(ErrorBody {
            detail: self.message,
            code: self.code,
            fields: self.fields,
        });

        if challenge {
            (status, [(WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<BdeError> for ApiError {
    fn from(err: BdeError) -> Self {
        match err {
            BdeError::AuthenticationRequired => ApiError::new(
                ErrorCode::AuthenticationRequired,
                "Authentication required",
            ),
            BdeError::AuthenticationFailed(msg) => {
                ApiError::new(ErrorCode::AuthenticationFailed, msg)
            }
            BdeError::Forbidden(msg) => ApiError::new(ErrorCode::Forbidden, msg),
            BdeError::NotFound(what) => ApiError::not_found(format!("{what} not found")),
            BdeError::Conflict(what) => {
                ApiError::new(ErrorCode::Duplicate, format!("{what} already exists"))
            }
            BdeError::Validation(msg) => ApiError::unprocessable(msg),
            other => {
                tracing::error!("Internal error: {}", other);
                ApiError::internal("An internal error occurred")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[test]
    fn test_error_code_status() {
        assert_eq!(
            ErrorCode::AuthenticationRequired.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ErrorCode::AuthenticationFailed.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::Duplicate.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::ValidationError.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            ErrorCode::InternalError.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_from_bde_error() {
        let cases = [
            (BdeError::AuthenticationRequired, ErrorCode::AuthenticationRequired),
            (
                BdeError::AuthenticationFailed("bad".to_string()),
                ErrorCode::AuthenticationFailed,
            ),
            (BdeError::Forbidden("off".to_string()), ErrorCode::Forbidden),
            (BdeError::NotFound("User".to_string()), ErrorCode::NotFound),
            (BdeError::Conflict("Part number".to_string()), ErrorCode::Duplicate),
            (BdeError::Validation("bad".to_string()), ErrorCode::ValidationError),
            (BdeError::Database("boom".to_string()), ErrorCode::InternalError),
        ];

        for (err, code) in cases {
            assert_eq!(ApiError::from(err).code(), code);
        }
    }

    #[test]
    fn test_internal_error_hides_details() {
        let err = ApiError::from(BdeError::Database("SELECT * FROM secrets".to_string()));
        assert!(!err.message().contains("SELECT"));
    }

    #[test]
    fn test_conflict_message() {
        let err = ApiError::from(BdeError::Conflict("Part number".to_string()));
        assert_eq!(err.message(), "Part number already exists");
    }

    #[tokio::test]
    async fn test_unauthorized_response_has_challenge() {
        let response = ApiError::from(BdeError::AuthenticationRequired).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(WWW_AUTHENTICATE).unwrap(), "Bearer");

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "AUTHENTICATION_REQUIRED");
        assert_eq!(body["detail"], "Authentication required");
        assert!(body.get("fields").is_none());
    }

    #[tokio::test]
    async fn test_validation_response_lists_fields() {
        let mut fields = HashMap::new();
        fields.insert("name".to_string(), vec!["Must not be empty".to_string()]);
        let response = ApiError::validation(fields).into_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(response.headers().get(WWW_AUTHENTICATE).is_none());

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["fields"]["name"][0], "Must not be empty");
    }
}

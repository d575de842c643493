//! Service Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response, Json},
};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("{0}")]
    UseCase(UseCaseError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Notification error: {message}")]
    Notification { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn notification(message: impl Into<String>) -> Self {
        Self::Notification { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Use case errors carry their own code/details triple.
        if let AuthError::UseCase(err) = &self {
            let status = StatusCode::from_u16(err.http_status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let details = if err.details().is_empty() {
                None
            } else {
                serde_json::to_value(err.details()).ok()
            };
            let body = ErrorResponse {
                error: err.code().to_string(),
                message: err.message().to_string(),
                details,
            };
            return (status, Json(body)).into_response();
        }

        let (status, error_type) = match &self {
            AuthError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AuthError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE"),
            AuthError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AuthError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AuthError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "INVALID_CREDENTIALS"),
            AuthError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            AuthError::InvalidToken { .. } => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Storage failures are logged here and surfaced without driver detail.
        let message = match &self {
            AuthError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Internal storage error".to_string()
            }
            AuthError::Serialization(e) => {
                tracing::error!("Serialization error: {}", e);
                "Internal storage error".to_string()
            }
            AuthError::Deserialization(e) => {
                tracing::error!("Deserialization error: {}", e);
                "Internal storage error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details: None,
        };

        (status, Json(body)).into_response()
    }
}

impl From<UseCaseError> for AuthError {
    fn from(err: UseCaseError) -> Self {
        AuthError::UseCase(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details;

    #[test]
    fn test_use_case_error_preserves_category() {
        let err: AuthError = UseCaseError::conflict_with_details(
            "ROLE_NAME_EXISTS",
            "Role already exists",
            details! { "property" => "name", "value" => "Manager" },
        )
        .into();

        match err {
            AuthError::UseCase(inner) => {
                assert_eq!(inner.http_status_code(), 409);
                assert_eq!(inner.code(), "ROLE_NAME_EXISTS");
            }
            other => panic!("Expected UseCase variant, got {:?}", other),
        }
    }

    #[test]
    fn test_not_found_display() {
        let err = AuthError::not_found("Role", "role-1");
        assert_eq!(err.to_string(), "Entity not found: Role with id role-1");
    }
}

//! Use Case Errors
//!
//! Categorized error types for use case failures. Errors are categorized
//! by kind to enable consistent HTTP status mapping, and each carries a
//! stable machine-readable code plus a details map naming the offending
//! property and value for field-level client display.
//!
//! # Creating Errors with Details
//!
//! Use the `details!` macro for convenient error creation:
//!
//! ```ignore
//! use ap_platform::usecase::UseCaseError;
//! use ap_platform::details;
//!
//! // Simple error
//! UseCaseError::validation("NAME_REQUIRED", "Role name is required");
//!
//! // Error with details
//! UseCaseError::conflict_with_details(
//!     "ROLE_NAME_EXISTS",
//!     "Role name already exists for this platform",
//!     details!{ "property" => "name", "value" => name },
//! );
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Macro for creating error detail maps.
#[macro_export]
macro_rules! details {
    () => {
        std::collections::HashMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut map = std::collections::HashMap::new();
        $(
            map.insert($key.to_string(), serde_json::json!($value));
        )+
        map
    }};
}

/// Categorized error types for use case failures.
///
/// Each variant maps to a specific HTTP status code:
/// - `ValidationError` -> 400 Bad Request
/// - `NotFoundError` -> 404 Not Found
/// - `ConflictError` -> 409 Conflict
/// - `CommitError` -> 500 Internal Server Error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Input validation failed (unregistered module, permission outside the
    /// registered superset, missing required field, etc.)
    /// Maps to HTTP 400 Bad Request.
    ValidationError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Entity not found or soft-deleted.
    /// Maps to HTTP 404 Not Found.
    NotFoundError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Uniqueness or referential guard violation.
    /// Maps to HTTP 409 Conflict.
    ConflictError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },

    /// Transactional write failed; the transaction was rolled back.
    /// Maps to HTTP 500 Internal Server Error.
    CommitError {
        code: String,
        message: String,
        #[serde(default)]
        details: HashMap<String, serde_json::Value>,
    },
}

impl UseCaseError {
    /// Create a validation error with the given code and message.
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a validation error with details.
    pub fn validation_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create a not found error.
    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a not found error with details.
    pub fn not_found_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create a conflict error.
    pub fn conflict(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConflictError {
            code: code.into(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Create a conflict error with details.
    pub fn conflict_with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: HashMap<String, serde_json::Value>,
    ) -> Self {
        Self::ConflictError {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    /// Create a commit error.
    pub fn commit(message: impl Into<String>) -> Self {
        Self::CommitError {
            code: "COMMIT_FAILED".to_string(),
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Get the error code.
    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::ConflictError { code, .. } => code,
            Self::CommitError { code, .. } => code,
        }
    }

    /// Get the error message.
    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::ConflictError { message, .. } => message,
            Self::CommitError { message, .. } => message,
        }
    }

    /// Get the error details.
    pub fn details(&self) -> &HashMap<String, serde_json::Value> {
        match self {
            Self::ValidationError { details, .. } => details,
            Self::NotFoundError { details, .. } => details,
            Self::ConflictError { details, .. } => details,
            Self::CommitError { details, .. } => details,
        }
    }

    /// Get the suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::NotFoundError { .. } => 404,
            Self::ConflictError { .. } => 409,
            Self::CommitError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::details;

    #[test]
    fn test_validation_error() {
        let err = UseCaseError::validation("NAME_REQUIRED", "Role name is required");
        assert_eq!(err.code(), "NAME_REQUIRED");
        assert_eq!(err.message(), "Role name is required");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_not_found_error() {
        let err = UseCaseError::not_found("ROLE_NOT_FOUND", "Role not found");
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_conflict_with_details() {
        let err = UseCaseError::conflict_with_details(
            "ROLE_NAME_EXISTS",
            "Role 'Manager' already exists",
            details! { "property" => "name", "value" => "Manager" },
        );

        assert_eq!(err.http_status_code(), 409);
        assert_eq!(err.details().get("property"), Some(&serde_json::json!("name")));
        assert_eq!(err.details().get("value"), Some(&serde_json::json!("Manager")));
    }

    #[test]
    fn test_details_macro_empty() {
        let details: HashMap<String, serde_json::Value> = details!();
        assert!(details.is_empty());
    }

    #[test]
    fn test_details_macro_multiple() {
        let module_id = "mod-123";
        let details = details! {
            "property" => "module_id",
            "value" => module_id,
            "count" => 3,
        };
        assert_eq!(details.get("value"), Some(&serde_json::json!("mod-123")));
        assert_eq!(details.get("count"), Some(&serde_json::json!(3)));
    }
}

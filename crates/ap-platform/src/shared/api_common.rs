//! Common API types and utilities

use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};

mod string_or_number {
    use serde::{Deserialize, Deserializer, de};

    // Query strings deserialize every value as a string when the struct
    // is #[serde(flatten)]-ed, so accept both forms.
    pub fn deserialize_i64_opt<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum StringOrNum {
            Num(i64),
            Str(String),
        }

        match Option::<StringOrNum>::deserialize(deserializer)? {
            Some(StringOrNum::Num(n)) => Ok(Some(n)),
            Some(StringOrNum::Str(s)) => s.parse().map(Some).map_err(de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Pagination parameters. Pages are 1-based; `limit` is the page size.
#[derive(Debug, Clone, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PaginationParams {
    #[serde(default, deserialize_with = "string_or_number::deserialize_i64_opt")]
    page: Option<i64>,
    #[serde(default, deserialize_with = "string_or_number::deserialize_i64_opt")]
    limit: Option<i64>,
}

impl PaginationParams {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10)
    }

    /// Number of documents to skip. Clamped so that page 0 or negative
    /// pages never produce a negative skip.
    pub fn skip(&self) -> u64 {
        ((self.page() - 1) * self.limit()).max(0) as u64
    }
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: Some(1),
            limit: Some(10),
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub current_page: i64,
    pub total_item: u64,
    pub limit: i64,
    pub items: Vec<T>,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, current_page: i64, limit: i64, total_item: u64) -> Self {
        Self {
            current_page,
            total_item,
            limit,
            items,
        }
    }
}

/// Success response with optional message
#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }
}

/// Escape a user-supplied search string for use inside a `$regex` filter.
pub fn escape_regex(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '.' | '^' | '$' | '*' | '+' | '?' | '(' | ')' | '[' | ']' | '{' | '}' | '|' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(page: Option<i64>, limit: Option<i64>) -> PaginationParams {
        PaginationParams { page, limit }
    }

    #[test]
    fn test_defaults() {
        let p = params(None, None);
        assert_eq!(p.page(), 1);
        assert_eq!(p.limit(), 10);
        assert_eq!(p.skip(), 0);
    }

    #[test]
    fn test_skip_is_one_based() {
        let p = params(Some(3), Some(10));
        assert_eq!(p.skip(), 20);
    }

    #[test]
    fn test_skip_never_negative() {
        assert_eq!(params(Some(0), Some(10)).skip(), 0);
        assert_eq!(params(Some(-2), Some(10)).skip(), 0);
    }

    #[test]
    fn test_accepts_stringly_typed_numbers() {
        // flattened query params arrive as strings
        let p: PaginationParams = serde_json::from_str(r#"{"page":"2","limit":"5"}"#).unwrap();
        assert_eq!(p.page(), 2);
        assert_eq!(p.limit(), 5);
        assert_eq!(p.skip(), 5);
    }

    #[test]
    fn test_paginated_response() {
        let page = PaginatedResponse::new(vec![1, 2, 3], 1, 10, 25);
        assert_eq!(page.total_item, 25);
        assert_eq!(page.items.len(), 3);
    }

    #[test]
    fn test_escape_regex() {
        assert_eq!(escape_regex("a.b*c"), "a\\.b\\*c");
        assert_eq!(escape_regex("plain"), "plain");
    }
}

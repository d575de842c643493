//! Special Role Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use uuid::Uuid;

use crate::shared::platform::Platform;

/// Platform-defined designation (admin, cashier, brand manager, ...)
/// optionally bound to exactly one role. A role may be referenced by at
/// most one special role, and a referenced role cannot be deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecialRole {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    /// Stable lookup code used by sibling services
    pub code: String,

    pub name: String,

    #[serde(default)]
    pub platform: Platform,

    /// Bound role, if any
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub role_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl SpecialRole {
    pub fn new(code: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            name: name.into(),
            platform,
            role_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Bind this designation to a role.
    pub fn bind_role(&mut self, role_id: impl Into<String>) {
        self.role_id = Some(role_id.into());
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_role() {
        let mut special = SpecialRole::new("store-admin", "Store Admin", Platform::Stores);
        assert!(special.role_id.is_none());

        special.bind_role("role-1");
        assert_eq!(special.role_id.as_deref(), Some("role-1"));
    }
}

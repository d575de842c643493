//! Module Permission Entity
//!
//! A permission module is a named capability unit carrying the
//! authoritative superset of permission strings that roles may be granted
//! for it. Modules belong to a display group and are ordered within it by
//! `sequence`.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use uuid::Uuid;

use crate::shared::platform::Platform;

/// Registered permission module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModulePermission {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    /// Short code, unique per `(code, platform)` among live modules
    pub code: String,

    /// Human-readable name
    pub name: String,

    /// Owning display group; nullable at creation, required before the
    /// module can be granted to a role
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub group_id: Option<String>,

    /// Authoritative superset of grantable permission strings
    #[serde(default)]
    pub permissions: Vec<String>,

    #[serde(default)]
    pub platform: Platform,

    /// Display/sort order within the owning group
    #[serde(default)]
    pub sequence: i32,

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

impl ModulePermission {
    pub fn new(code: impl Into<String>, name: impl Into<String>, platform: Platform) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.into(),
            name: name.into(),
            group_id: None,
            permissions: Vec::new(),
            platform,
            sequence: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    pub fn with_sequence(mut self, sequence: i32) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_permissions(mut self, permissions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a permission string is part of this module's registered
    /// superset.
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let module = ModulePermission::new("merchant", "Kelola Merchant", Platform::Superadmin)
            .with_group("group-1")
            .with_sequence(2)
            .with_permissions(["read", "write", "delete"]);

        assert_eq!(module.code, "merchant");
        assert_eq!(module.group_id.as_deref(), Some("group-1"));
        assert_eq!(module.sequence, 2);
        assert!(module.has_permission("write"));
        assert!(!module.has_permission("execute"));
    }
}

//! Role Entities
//!
//! A role is a named bundle of module-permission grants scoped to a
//! platform. The grants themselves are link rows (`RoleModuleLink`) owned
//! by the role: they carry the caller-chosen subset of the module's
//! registered permissions and are regenerated wholesale on every update.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::shared::platform::Platform;

/// Role activation status. New roles default to inactive until an
/// administrator explicitly activates them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum RoleStatus {
    Active,
    Inactive,
}

impl Default for RoleStatus {
    fn default() -> Self {
        Self::Inactive
    }
}

impl RoleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Role definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub platform: Platform,

    #[serde(default)]
    pub status: RoleStatus,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,

    /// Soft-delete tombstone; absent for live roles.
    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Role {
    pub fn new(name: impl Into<String>, platform: Platform, status: RoleStatus) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            platform,
            status,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Join row linking a role to a permission module, restricted to the
/// role's active subset of that module's registered permissions.
///
/// Logically keyed by `(role_id, module_id)`; the surrogate `_id` exists
/// only because the storage layer wants a single primary key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleModuleLink {
    #[serde(rename = "_id")]
    pub id: String,

    pub role_id: String,

    pub module_id: String,

    #[serde(default)]
    pub active_permissions: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        default,
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime_optional"
    )]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl RoleModuleLink {
    pub fn new(
        role_id: impl Into<String>,
        module_id: impl Into<String>,
        active_permissions: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role_id: role_id.into(),
            module_id: module_id.into(),
            active_permissions,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_inactive() {
        assert_eq!(RoleStatus::default(), RoleStatus::Inactive);

        let json = serde_json::to_string(&RoleStatus::Inactive).unwrap();
        assert_eq!(json, "\"inactive\"");
    }

    #[test]
    fn test_new_role_is_live() {
        let role = Role::new("Manager", Platform::Stores, RoleStatus::default());
        assert!(!role.is_deleted());
        assert_eq!(role.status, RoleStatus::Inactive);
        assert!(!role.id.is_empty());
    }

    #[test]
    fn test_link_carries_active_subset() {
        let link = RoleModuleLink::new("r1", "m1", vec!["read".to_string()]);
        assert_eq!(link.role_id, "r1");
        assert_eq!(link.module_id, "m1");
        assert_eq!(link.active_permissions, vec!["read"]);
    }
}

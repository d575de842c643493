//! Module Group Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use uuid::Uuid;

use crate::shared::platform::Platform;

/// Named, sequenced bucket organizing permission modules for
/// display/administration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleGroup {
    /// UUID as string
    #[serde(rename = "_id")]
    pub id: String,

    pub name: String,

    #[serde(default)]
    pub platform: Platform,

    /// Display/sort order within a platform
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

impl ModuleGroup {
    pub fn new(name: impl Into<String>, platform: Platform, sequence: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            platform,
            sequence,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_group() {
        let group = ModuleGroup::new("Kelola", Platform::Superadmin, 1);
        assert_eq!(group.name, "Kelola");
        assert_eq!(group.sequence, 1);
        assert!(!group.is_deleted());
    }
}

//! Role and Role-Module-Link Repositories
//!
//! Reads only: every write to a role or its link rows goes through the
//! transactional unit of work so a partial link set is never visible.

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;

use crate::role::entity::{Role, RoleModuleLink, RoleStatus};
use crate::shared::api_common::escape_regex;
use crate::shared::error::Result;
use crate::shared::platform::Platform;

pub struct RoleRepository {
    collection: Collection<Role>,
}

impl RoleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("roles"),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Role>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "deleted_at": null })
            .await?)
    }

    /// Uniqueness pre-check lookup: live role with exactly this name and
    /// platform.
    pub async fn find_by_name_and_platform(
        &self,
        name: &str,
        platform: Platform,
    ) -> Result<Option<Role>> {
        Ok(self
            .collection
            .find_one(doc! {
                "name": name,
                "platform": platform.as_str(),
                "deleted_at": null,
            })
            .await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<Role>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Page of live roles ordered by name ascending. Status defaults to
    /// both active and inactive when omitted; platform defaults to all.
    pub async fn search(
        &self,
        search: Option<&str>,
        status: Option<RoleStatus>,
        platform: Option<Platform>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Role>> {
        let options = FindOptions::builder()
            .sort(doc! { "name": 1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self
            .collection
            .find(Self::search_filter(search, status, platform))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(
        &self,
        search: Option<&str>,
        status: Option<RoleStatus>,
        platform: Option<Platform>,
    ) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(Self::search_filter(search, status, platform))
            .await?)
    }

    fn search_filter(
        search: Option<&str>,
        status: Option<RoleStatus>,
        platform: Option<Platform>,
    ) -> mongodb::bson::Document {
        let mut filter = doc! { "deleted_at": null };
        match status {
            Some(status) => {
                filter.insert("status", status.as_str());
            }
            None => {
                filter.insert(
                    "status",
                    doc! { "$in": [RoleStatus::Active.as_str(), RoleStatus::Inactive.as_str()] },
                );
            }
        }
        if let Some(platform) = platform {
            filter.insert("platform", platform.as_str());
        }
        if let Some(search) = search {
            if !search.is_empty() {
                filter.insert("name", doc! { "$regex": escape_regex(search), "$options": "i" });
            }
        }
        filter
    }
}

pub struct RoleModuleLinkRepository {
    collection: Collection<RoleModuleLink>,
}

impl RoleModuleLinkRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("role_modules"),
        }
    }

    /// Live link rows for a batch of roles; callers group them per role.
    pub async fn find_by_role_ids(&self, role_ids: &[String]) -> Result<Vec<RoleModuleLink>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "role_id": { "$in": role_ids }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_filter_defaults_to_both() {
        let filter = RoleRepository::search_filter(None, None, None);
        let status = filter.get_document("status").unwrap();
        let both = status.get_array("$in").unwrap();
        assert_eq!(both.len(), 2);
    }

    #[test]
    fn test_status_filter_restricts_when_present() {
        let filter = RoleRepository::search_filter(None, Some(RoleStatus::Active), None);
        assert_eq!(filter.get_str("status").unwrap(), "active");
    }

    #[test]
    fn test_search_filter_lowercases_nothing() {
        // case-insensitivity comes from the $options flag, not from
        // mangling the input
        let filter = RoleRepository::search_filter(Some("Man"), None, Some(Platform::Stores));
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$regex").unwrap(), "Man");
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }
}

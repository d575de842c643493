//! Module Permission Repository
//!
//! Ground truth for the role-permission linker. Soft-deleted modules are
//! excluded from every query.

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use chrono::Utc;

use crate::module_permission::entity::ModulePermission;
use crate::shared::api_common::escape_regex;
use crate::shared::error::Result;
use crate::shared::platform::Platform;

pub struct ModulePermissionRepository {
    collection: Collection<ModulePermission>,
}

impl ModulePermissionRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("module_permissions"),
        }
    }

    pub async fn insert(&self, module: &ModulePermission) -> Result<()> {
        self.collection.insert_one(module).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ModulePermission>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "deleted_at": null })
            .await?)
    }

    pub async fn find_by_code_and_platform(
        &self,
        code: &str,
        platform: Platform,
    ) -> Result<Option<ModulePermission>> {
        Ok(self
            .collection
            .find_one(doc! {
                "code": code,
                "platform": platform.as_str(),
                "deleted_at": null,
            })
            .await?)
    }

    /// Load the full registry of live modules. Used by the linker as the
    /// authoritative permission superset.
    pub async fn get_all(&self) -> Result<Vec<ModulePermission>> {
        let cursor = self.collection.find(doc! { "deleted_at": null }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<ModulePermission>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Live modules belonging to the given groups, ordered by sequence.
    pub async fn find_by_group_ids(&self, group_ids: &[String]) -> Result<Vec<ModulePermission>> {
        if group_ids.is_empty() {
            return Ok(Vec::new());
        }
        let options = FindOptions::builder()
            .sort(doc! { "sequence": 1 })
            .build();
        let cursor = self
            .collection
            .find(doc! { "group_id": { "$in": group_ids }, "deleted_at": null })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, module: &ModulePermission) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &module.id }, module)
            .await?;
        Ok(())
    }

    pub async fn soft_delete(&self, id: &str) -> Result<bool> {
        let now = bson::DateTime::from_chrono(Utc::now());
        let result = self
            .collection
            .update_one(
                doc! { "_id": id, "deleted_at": null },
                doc! { "$set": { "deleted_at": now, "updated_at": now } },
            )
            .await?;
        Ok(result.modified_count > 0)
    }

    pub async fn search(
        &self,
        search: Option<&str>,
        platform: Option<Platform>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<ModulePermission>> {
        let options = FindOptions::builder().skip(skip).limit(limit).build();
        let cursor = self
            .collection
            .find(Self::search_filter(search, platform))
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, search: Option<&str>, platform: Option<Platform>) -> Result<u64> {
        Ok(self
            .collection
            .count_documents(Self::search_filter(search, platform))
            .await?)
    }

    fn search_filter(search: Option<&str>, platform: Option<Platform>) -> mongodb::bson::Document {
        let mut filter = doc! { "deleted_at": null };
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_filter_platform_absent_matches_all() {
        let filter = ModulePermissionRepository::search_filter(None, None);
        assert!(filter.get("platform").is_none());
        assert!(filter.get("name").is_none());
    }

    #[test]
    fn test_search_filter_restricts_platform_and_name() {
        let filter =
            ModulePermissionRepository::search_filter(Some("merchant"), Some(Platform::Stores));
        assert_eq!(filter.get_str("platform").unwrap(), "STORES");
        let name = filter.get_document("name").unwrap();
        assert_eq!(name.get_str("$options").unwrap(), "i");
    }
}

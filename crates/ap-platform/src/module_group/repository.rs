//! Module Group Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use chrono::Utc;

use crate::module_group::entity::ModuleGroup;
use crate::shared::api_common::escape_regex;
use crate::shared::error::Result;
use crate::shared::platform::Platform;

pub struct ModuleGroupRepository {
    collection: Collection<ModuleGroup>,
}

impl ModuleGroupRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("module_groups"),
        }
    }

    pub async fn insert(&self, group: &ModuleGroup) -> Result<()> {
        self.collection.insert_one(group).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<ModuleGroup>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "deleted_at": null })
            .await?)
    }

    pub async fn find_by_ids(&self, ids: &[String]) -> Result<Vec<ModuleGroup>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, group: &ModuleGroup) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &group.id }, group)
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

    /// Page of live groups ordered by sequence. Permissions are nested by
    /// the caller after a batch module fetch.
    pub async fn search(
        &self,
        search: Option<&str>,
        platform: Option<Platform>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<ModuleGroup>> {
        let options = FindOptions::builder()
            .sort(doc! { "sequence": 1 })
            .skip(skip)
            .limit(limit)
            .build();
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
    fn test_search_filter_excludes_tombstones() {
        let filter = ModuleGroupRepository::search_filter(None, Some(Platform::Superadmin));
        assert!(filter.get("deleted_at").is_some());
        assert_eq!(filter.get_str("platform").unwrap(), "SUPERADMIN");
    }
}

//! Special Role Repository

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;

use crate::shared::api_common::escape_regex;
use crate::shared::error::Result;
use crate::special_role::entity::SpecialRole;

pub struct SpecialRoleRepository {
    collection: Collection<SpecialRole>,
}

impl SpecialRoleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("special_roles"),
        }
    }

    pub async fn find_all(&self, search: Option<&str>) -> Result<Vec<SpecialRole>> {
        let mut filter = doc! { "deleted_at": null };
        if let Some(search) = search {
            if !search.is_empty() {
                filter.insert("name", doc! { "$regex": escape_regex(search), "$options": "i" });
            }
        }
        let cursor = self.collection.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<SpecialRole>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": id, "deleted_at": null })
            .await?)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<SpecialRole>> {
        Ok(self
            .collection
            .find_one(doc! { "code": code, "deleted_at": null })
            .await?)
    }

    pub async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<SpecialRole>> {
        if codes.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "code": { "$in": codes }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Referential guard lookup: the special role bound to this role, if
    /// any. A role with a match here cannot be deleted.
    pub async fn find_by_role_id(&self, role_id: &str) -> Result<Option<SpecialRole>> {
        Ok(self
            .collection
            .find_one(doc! { "role_id": role_id, "deleted_at": null })
            .await?)
    }

    pub async fn find_by_role_ids(&self, role_ids: &[String]) -> Result<Vec<SpecialRole>> {
        if role_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .collection
            .find(doc! { "role_id": { "$in": role_ids }, "deleted_at": null })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, special_role: &SpecialRole) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &special_role.id }, special_role)
            .await?;
        Ok(())
    }
}

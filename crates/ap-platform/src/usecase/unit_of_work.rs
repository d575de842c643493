//! Unit of Work
//!
//! Atomic commit of a role together with its module link rows within a
//! single MongoDB transaction.
//!
//! A role's link set is always written as a whole: creation inserts the
//! role and every link together, update drops every existing link row
//! before inserting the fresh set, and deletion tombstones the role and
//! cascades the tombstone to its links. If any step fails the transaction
//! is aborted and the prior state stays visible - a partial link set is
//! never observable.

use async_trait::async_trait;
use chrono::Utc;
use mongodb::{
    Client, ClientSession, Database,
    bson::{doc, Document, to_document},
};
use tracing::{debug, error};

use super::error::UseCaseError;
use crate::role::entity::{Role, RoleModuleLink};

/// Atomic persistence boundary for role writes.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Persist a new role and its validated link rows. Both succeed or
    /// both fail.
    async fn commit_new_role(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError>;

    /// Replace a role's state and its entire link set: within one
    /// transaction, hard-delete all existing link rows for the role,
    /// upsert the role document (original id preserved), then insert the
    /// fresh links. Drop-then-recreate, never diff/merge.
    async fn commit_role_replace(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError>;

    /// Tombstone a role and cascade the tombstone to its live link rows.
    async fn commit_role_soft_delete(&self, role: &Role) -> Result<(), UseCaseError>;
}

const ROLES: &str = "roles";
const ROLE_MODULES: &str = "role_modules";

/// MongoDB implementation of [`UnitOfWork`] using multi-document
/// transactions.
///
/// # Requirements:
/// - MongoDB 4.0+ (for multi-document transactions)
/// - Replica set deployment (transactions require replica set)
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    async fn start_transaction(&self) -> Result<ClientSession, UseCaseError> {
        let mut session = self.client.start_session().await.map_err(|e| {
            error!("Failed to start MongoDB session: {}", e);
            UseCaseError::commit(format!("Failed to start session: {}", e))
        })?;

        session.start_transaction().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            UseCaseError::commit(format!("Failed to start transaction: {}", e))
        })?;

        Ok(session)
    }

    async fn abort(session: &mut ClientSession, context: &str, err: impl std::fmt::Display) -> UseCaseError {
        let _ = session.abort_transaction().await;
        error!("{}: {}", context, err);
        UseCaseError::commit(format!("{}: {}", context, err))
    }

    async fn insert_links(
        &self,
        session: &mut ClientSession,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError> {
        if links.is_empty() {
            return Ok(());
        }
        let collection = self.database.collection::<RoleModuleLink>(ROLE_MODULES);
        if let Err(e) = collection.insert_many(links).session(&mut *session).await {
            return Err(Self::abort(session, "Failed to insert role links", e).await);
        }
        Ok(())
    }

    async fn commit(session: &mut ClientSession) -> Result<(), UseCaseError> {
        session.commit_transaction().await.map_err(|e| {
            error!("Failed to commit transaction: {}", e);
            UseCaseError::commit(format!("Failed to commit transaction: {}", e))
        })
    }

    fn role_document(role: &Role) -> Result<Document, UseCaseError> {
        to_document(role)
            .map_err(|e| UseCaseError::commit(format!("Failed to serialize role: {}", e)))
    }
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    async fn commit_new_role(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError> {
        let mut session = self.start_transaction().await?;

        let roles = self.database.collection::<Role>(ROLES);
        if let Err(e) = roles.insert_one(role).session(&mut session).await {
            return Err(Self::abort(&mut session, "Failed to insert role", e).await);
        }

        self.insert_links(&mut session, links).await?;
        Self::commit(&mut session).await?;

        debug!(role_id = %role.id, link_count = links.len(), "Committed new role");
        Ok(())
    }

    async fn commit_role_replace(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError> {
        let mut session = self.start_transaction().await?;

        // Drop the prior link set first; the inserts below must only ever
        // be visible together with this delete.
        let link_collection = self.database.collection::<RoleModuleLink>(ROLE_MODULES);
        match link_collection
            .delete_many(doc! { "role_id": &role.id })
            .session(&mut session)
            .await
        {
            Ok(result) => {
                debug!(role_id = %role.id, dropped = result.deleted_count, "Dropped previous role links");
            }
            Err(e) => {
                return Err(Self::abort(&mut session, "Failed to drop role links", e).await);
            }
        }

        let role_doc = match Self::role_document(role) {
            Ok(d) => d,
            Err(e) => {
                let _ = session.abort_transaction().await;
                return Err(e);
            }
        };

        let roles = self.database.collection::<Document>(ROLES);
        if let Err(e) = roles
            .update_one(doc! { "_id": &role.id }, doc! { "$set": &role_doc })
            .upsert(true)
            .session(&mut session)
            .await
        {
            return Err(Self::abort(&mut session, "Failed to persist role", e).await);
        }

        self.insert_links(&mut session, links).await?;
        Self::commit(&mut session).await?;

        debug!(role_id = %role.id, link_count = links.len(), "Committed role replace");
        Ok(())
    }

    async fn commit_role_soft_delete(&self, role: &Role) -> Result<(), UseCaseError> {
        let mut session = self.start_transaction().await?;
        let now = bson::DateTime::from_chrono(Utc::now());

        let roles = self.database.collection::<Document>(ROLES);
        if let Err(e) = roles
            .update_one(
                doc! { "_id": &role.id },
                doc! { "$set": { "deleted_at": now, "updated_at": now } },
            )
            .session(&mut session)
            .await
        {
            return Err(Self::abort(&mut session, "Failed to soft-delete role", e).await);
        }

        let link_collection = self.database.collection::<Document>(ROLE_MODULES);
        if let Err(e) = link_collection
            .update_many(
                doc! { "role_id": &role.id, "deleted_at": null },
                doc! { "$set": { "deleted_at": now } },
            )
            .session(&mut session)
            .await
        {
            return Err(Self::abort(&mut session, "Failed to soft-delete role links", e).await);
        }

        Self::commit(&mut session).await?;

        debug!(role_id = %role.id, "Committed role soft delete");
        Ok(())
    }
}

/// In-memory UnitOfWork for testing.
#[cfg(test)]
pub struct InMemoryUnitOfWork {
    pub roles: std::sync::Mutex<Vec<Role>>,
    pub links: std::sync::Mutex<Vec<RoleModuleLink>>,
}

#[cfg(test)]
impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self {
            roles: std::sync::Mutex::new(Vec::new()),
            links: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn live_links_for(&self, role_id: &str) -> Vec<RoleModuleLink> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .filter(|l| l.role_id == role_id && l.deleted_at.is_none())
            .cloned()
            .collect()
    }
}

#[cfg(test)]
#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit_new_role(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError> {
        self.roles.lock().unwrap().push(role.clone());
        self.links.lock().unwrap().extend_from_slice(links);
        Ok(())
    }

    async fn commit_role_replace(
        &self,
        role: &Role,
        links: &[RoleModuleLink],
    ) -> Result<(), UseCaseError> {
        {
            let mut stored = self.links.lock().unwrap();
            stored.retain(|l| l.role_id != role.id);
            stored.extend_from_slice(links);
        }
        let mut roles = self.roles.lock().unwrap();
        roles.retain(|r| r.id != role.id);
        roles.push(role.clone());
        Ok(())
    }

    async fn commit_role_soft_delete(&self, role: &Role) -> Result<(), UseCaseError> {
        let now = Utc::now();
        for stored in self.roles.lock().unwrap().iter_mut() {
            if stored.id == role.id {
                stored.deleted_at = Some(now);
            }
        }
        for link in self.links.lock().unwrap().iter_mut() {
            if link.role_id == role.id && link.deleted_at.is_none() {
                link.deleted_at = Some(now);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::platform::Platform;
    use crate::role::entity::RoleStatus;

    fn role_with_links(name: &str, modules: &[&str]) -> (Role, Vec<RoleModuleLink>) {
        let role = Role::new(name, Platform::Stores, RoleStatus::default());
        let links = modules
            .iter()
            .map(|m| RoleModuleLink::new(&role.id, *m, vec!["read".to_string()]))
            .collect();
        (role, links)
    }

    #[tokio::test]
    async fn test_replace_leaves_exactly_the_new_set() {
        let uow = InMemoryUnitOfWork::new();
        let (role, links) = role_with_links("Manager", &["m1", "m2"]);
        uow.commit_new_role(&role, &links).await.unwrap();
        assert_eq!(uow.live_links_for(&role.id).len(), 2);

        // Replace with a disjoint set; nothing from the prior state survives.
        let fresh = vec![RoleModuleLink::new(&role.id, "m3", vec!["write".to_string()])];
        uow.commit_role_replace(&role, &fresh).await.unwrap();

        let live = uow.live_links_for(&role.id);
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].module_id, "m3");
    }

    #[tokio::test]
    async fn test_replace_does_not_touch_other_roles() {
        let uow = InMemoryUnitOfWork::new();
        let (role_a, links_a) = role_with_links("A", &["m1"]);
        let (role_b, links_b) = role_with_links("B", &["m2"]);
        uow.commit_new_role(&role_a, &links_a).await.unwrap();
        uow.commit_new_role(&role_b, &links_b).await.unwrap();

        uow.commit_role_replace(&role_a, &[]).await.unwrap();

        assert!(uow.live_links_for(&role_a.id).is_empty());
        assert_eq!(uow.live_links_for(&role_b.id).len(), 1);
    }

    #[tokio::test]
    async fn test_soft_delete_cascades_to_links() {
        let uow = InMemoryUnitOfWork::new();
        let (role, links) = role_with_links("Manager", &["m1", "m2"]);
        uow.commit_new_role(&role, &links).await.unwrap();

        uow.commit_role_soft_delete(&role).await.unwrap();

        assert!(uow.live_links_for(&role.id).is_empty());
        let roles = uow.roles.lock().unwrap();
        assert!(roles.iter().find(|r| r.id == role.id).unwrap().deleted_at.is_some());
    }
}

//! Update Role Use Case
//!
//! A role update fully replaces the link set: the prior rows are dropped
//! and the validated fresh set inserted inside one transaction, so a
//! mid-failure leaves the previous links intact.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::module_permission::repository::ModulePermissionRepository;
use crate::role::entity::{Role, RoleStatus};
use crate::role::linker::{link_role_permissions, ModulePermissionGrant};
use crate::role::repository::RoleRepository;
use crate::shared::platform::Platform;
use crate::usecase::{UnitOfWork, UseCaseError};

/// Command for updating an existing role. The link list is authoritative:
/// whatever is supplied here is the role's entire grant set afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleCommand {
    pub role_id: String,

    pub name: String,

    pub platform: Platform,

    /// Defaults to inactive when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoleStatus>,

    #[serde(default)]
    pub module_permissions: Vec<ModulePermissionGrant>,
}

/// Use case for replacing a role's state and link set.
pub struct UpdateRoleUseCase<U: UnitOfWork> {
    roles: Arc<RoleRepository>,
    modules: Arc<ModulePermissionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UpdateRoleUseCase<U> {
    pub fn new(
        roles: Arc<RoleRepository>,
        modules: Arc<ModulePermissionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            roles,
            modules,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: UpdateRoleCommand) -> Result<Role, UseCaseError> {
        if command.role_id.trim().is_empty() {
            return Err(UseCaseError::validation(
                "ROLE_ID_REQUIRED",
                "Role ID is required",
            ));
        }

        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation(
                "NAME_REQUIRED",
                "Role name is required",
            ));
        }

        let existing = self
            .roles
            .find_by_id(&command.role_id)
            .await
            .map_err(|e| UseCaseError::commit(format!("Failed to fetch role: {}", e)))?
            .ok_or_else(|| {
                UseCaseError::not_found(
                    "ROLE_NOT_FOUND",
                    format!("Role with ID '{}' not found", command.role_id),
                )
            })?;

        let registry = self
            .modules
            .get_all()
            .await
            .map_err(|e| UseCaseError::commit(format!("Failed to load permission registry: {}", e)))?;

        // Original id and creation time survive the replace
        let mut role = existing;
        role.name = name.to_string();
        role.platform = command.platform;
        role.status = command.status.unwrap_or_default();
        role.updated_at = chrono::Utc::now();

        let links = link_role_permissions(&role.id, &command.module_permissions, &registry)?;

        self.unit_of_work.commit_role_replace(&role, &links).await?;

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = UpdateRoleCommand {
            role_id: "role-123".to_string(),
            name: "Supervisor".to_string(),
            platform: Platform::Superadmin,
            status: None,
            module_permissions: vec![ModulePermissionGrant {
                module_id: "m1".to_string(),
                permissions: vec!["read".to_string()],
            }],
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("role-123"));
        assert!(json.contains("Supervisor"));
        assert!(!json.contains("status"));
    }
}

//! Create Role Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::details;
use crate::module_permission::repository::ModulePermissionRepository;
use crate::role::entity::{Role, RoleStatus};
use crate::role::linker::{link_role_permissions, ModulePermissionGrant};
use crate::role::repository::RoleRepository;
use crate::shared::platform::Platform;
use crate::usecase::{UnitOfWork, UseCaseError};

/// Command for creating a new role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRoleCommand {
    pub name: String,

    pub platform: Platform,

    /// Defaults to inactive when omitted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RoleStatus>,

    #[serde(default)]
    pub module_permissions: Vec<ModulePermissionGrant>,
}

/// Use case for creating a new role together with its validated links.
pub struct CreateRoleUseCase<U: UnitOfWork> {
    roles: Arc<RoleRepository>,
    modules: Arc<ModulePermissionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateRoleUseCase<U> {
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

    pub async fn execute(&self, command: CreateRoleCommand) -> Result<Role, UseCaseError> {
        let name = command.name.trim();
        if name.is_empty() {
            return Err(UseCaseError::validation(
                "NAME_REQUIRED",
                "Role name is required",
            ));
        }

        // Uniqueness: one live role per (name, platform)
        let existing = self
            .roles
            .find_by_name_and_platform(name, command.platform)
            .await
            .map_err(|e| UseCaseError::commit(format!("Failed to check role uniqueness: {}", e)))?;
        if existing.is_some() {
            return Err(UseCaseError::conflict_with_details(
                "ROLE_NAME_EXISTS",
                format!(
                    "Role name '{}' already exists for platform {}",
                    name, command.platform
                ),
                details! { "property" => "name", "value" => name },
            ));
        }

        // Whole-batch validation against the registry before any write
        let registry = self
            .modules
            .get_all()
            .await
            .map_err(|e| UseCaseError::commit(format!("Failed to load permission registry: {}", e)))?;

        let role = Role::new(name, command.platform, command.status.unwrap_or_default());
        let links = link_role_permissions(&role.id, &command.module_permissions, &registry)?;

        self.unit_of_work.commit_new_role(&role, &links).await?;

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_deserialization_defaults() {
        let json = r#"{
            "name": "Manager",
            "platform": "STORES",
            "module_permissions": [
                { "module_id": "m1", "permissions": ["read", "write"] }
            ]
        }"#;

        let cmd: CreateRoleCommand = serde_json::from_str(json).unwrap();
        assert_eq!(cmd.name, "Manager");
        assert_eq!(cmd.platform, Platform::Stores);
        assert!(cmd.status.is_none());
        assert_eq!(cmd.module_permissions.len(), 1);
        assert_eq!(cmd.module_permissions[0].permissions, vec!["read", "write"]);
    }

    #[test]
    fn test_command_serialization() {
        let cmd = CreateRoleCommand {
            name: "Manager".to_string(),
            platform: Platform::Stores,
            status: Some(RoleStatus::Active),
            module_permissions: vec![],
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("Manager"));
        assert!(json.contains("STORES"));
        assert!(json.contains("active"));
    }
}

//! Delete Role Use Case
//!
//! Deletion is a soft delete that cascades the tombstone to the role's
//! link rows. A role still referenced by a special role cannot be
//! deleted; the reference must be rebound first.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::details;
use crate::role::entity::Role;
use crate::role::repository::RoleRepository;
use crate::special_role::repository::SpecialRoleRepository;
use crate::usecase::{UnitOfWork, UseCaseError};

/// Command for deleting a role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteRoleCommand {
    pub role_id: String,
}

/// Use case for soft-deleting a role.
pub struct DeleteRoleUseCase<U: UnitOfWork> {
    roles: Arc<RoleRepository>,
    special_roles: Arc<SpecialRoleRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeleteRoleUseCase<U> {
    pub fn new(
        roles: Arc<RoleRepository>,
        special_roles: Arc<SpecialRoleRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            roles,
            special_roles,
            unit_of_work,
        }
    }

    pub async fn execute(&self, command: DeleteRoleCommand) -> Result<Role, UseCaseError> {
        if command.role_id.trim().is_empty() {
            return Err(UseCaseError::validation(
                "ROLE_ID_REQUIRED",
                "Role ID is required",
            ));
        }

        let role = self
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

        // Referential guard: a bound special role blocks deletion
        let bound = self
            .special_roles
            .find_by_role_id(&role.id)
            .await
            .map_err(|e| UseCaseError::commit(format!("Failed to check special roles: {}", e)))?;
        if let Some(special) = bound {
            return Err(UseCaseError::conflict_with_details(
                "ROLE_IN_USE_BY_SPECIAL_ROLE",
                format!(
                    "Role '{}' is referenced by special role '{}' and cannot be deleted",
                    role.name, special.code
                ),
                details! { "property" => "role_id", "value" => role.id },
            ));
        }

        self.unit_of_work.commit_role_soft_delete(&role).await?;

        Ok(role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = DeleteRoleCommand {
            role_id: "role-123".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("role-123"));
    }
}

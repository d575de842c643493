//! Role-Permission Linker
//!
//! Turns an untrusted list of `{module_id, permissions}` grants into
//! validated link rows, or fails fast. The whole batch validates before
//! anything is persisted: one bad grant invalidates the entire role
//! write.
//!
//! The registry slice is loaded once by the calling use case
//! (`ModulePermissionRepository::get_all`), which keeps this function
//! pure and testable without a database.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::details;
use crate::module_permission::entity::ModulePermission;
use crate::role::entity::RoleModuleLink;
use crate::usecase::UseCaseError;

/// One requested grant: a permission module and the subset of its
/// registered permissions the role should hold.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModulePermissionGrant {
    pub module_id: String,

    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Validate every grant against the registry and materialize the link
/// rows for `role_id`.
///
/// Fails with a `ValidationError` when a grant names an unregistered
/// module, or requests permissions outside the module's registered
/// superset. Permissions are never silently clamped.
pub fn link_role_permissions(
    role_id: &str,
    requested: &[ModulePermissionGrant],
    registry: &[ModulePermission],
) -> Result<Vec<RoleModuleLink>, UseCaseError> {
    let mut links = Vec::with_capacity(requested.len());

    for grant in requested {
        let module = registry
            .iter()
            .find(|m| m.id == grant.module_id)
            .ok_or_else(|| {
                UseCaseError::validation_with_details(
                    "MODULE_NOT_REGISTERED",
                    format!(
                        "Permission module '{}' is not registered in the permission records",
                        grant.module_id
                    ),
                    details! { "property" => "module_id", "value" => grant.module_id },
                )
            })?;

        let registered: HashSet<&str> = module.permissions.iter().map(String::as_str).collect();
        let outer: Vec<&str> = grant
            .permissions
            .iter()
            .map(String::as_str)
            .filter(|p| !registered.contains(p))
            .collect();

        if !outer.is_empty() {
            return Err(UseCaseError::validation_with_details(
                "PERMISSIONS_NOT_REGISTERED",
                format!(
                    "Permissions [{}] are not registered for module '{}'",
                    outer.join(", "),
                    module.code
                ),
                details! {
                    "property" => "permissions",
                    "value" => outer,
                    "module_code" => module.code,
                },
            ));
        }

        links.push(RoleModuleLink::new(
            role_id,
            &module.id,
            grant.permissions.clone(),
        ));
    }

    Ok(links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::platform::Platform;

    fn registry() -> Vec<ModulePermission> {
        vec![
            ModulePermission::new("merchant", "Kelola Merchant", Platform::Stores)
                .with_group("g1")
                .with_permissions(["read", "write", "delete"]),
            ModulePermission::new("voucher", "Kelola Voucher", Platform::Stores)
                .with_group("g1")
                .with_permissions(["read"]),
        ]
    }

    fn grant(module_id: &str, permissions: &[&str]) -> ModulePermissionGrant {
        ModulePermissionGrant {
            module_id: module_id.to_string(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn test_valid_subset_links() {
        let registry = registry();
        let grants = vec![grant(&registry[0].id, &["read", "write"])];

        let links = link_role_permissions("role-1", &grants, &registry).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].role_id, "role-1");
        assert_eq!(links[0].module_id, registry[0].id);
        assert_eq!(links[0].active_permissions, vec!["read", "write"]);
    }

    #[test]
    fn test_unregistered_module_fails() {
        let registry = registry();
        let grants = vec![grant("missing-module", &["read"])];

        let err = link_role_permissions("role-1", &grants, &registry).unwrap_err();

        assert_eq!(err.code(), "MODULE_NOT_REGISTERED");
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(
            err.details().get("value"),
            Some(&serde_json::json!("missing-module"))
        );
    }

    #[test]
    fn test_permission_outside_superset_fails_naming_offenders() {
        let registry = registry();
        let grants = vec![grant(&registry[0].id, &["read", "execute"])];

        let err = link_role_permissions("role-1", &grants, &registry).unwrap_err();

        assert_eq!(err.code(), "PERMISSIONS_NOT_REGISTERED");
        assert!(err.message().contains("execute"));
        assert!(err.message().contains("merchant"));
        assert_eq!(
            err.details().get("module_code"),
            Some(&serde_json::json!("merchant"))
        );
    }

    #[test]
    fn test_never_clamps_silently() {
        // A request mixing valid and invalid permissions must fail, not
        // come back trimmed to the valid ones.
        let registry = registry();
        let grants = vec![grant(&registry[1].id, &["read", "write"])];

        assert!(link_role_permissions("role-1", &grants, &registry).is_err());
    }

    #[test]
    fn test_single_bad_grant_invalidates_the_batch() {
        let registry = registry();
        let grants = vec![
            grant(&registry[0].id, &["read"]),
            grant("missing-module", &["read"]),
        ];

        assert!(link_role_permissions("role-1", &grants, &registry).is_err());
    }

    #[test]
    fn test_empty_batch_yields_no_links() {
        let registry = registry();
        let links = link_role_permissions("role-1", &[], &registry).unwrap();
        assert!(links.is_empty());
    }

    #[test]
    fn test_empty_permission_list_is_a_valid_subset() {
        let registry = registry();
        let grants = vec![grant(&registry[1].id, &[])];

        let links = link_role_permissions("role-1", &grants, &registry).unwrap();
        assert!(links[0].active_permissions.is_empty());
    }
}

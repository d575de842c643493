//! Platform Integration Tests
//!
//! Tests for the RBAC domain pipeline that run without a database: the
//! linker against an in-memory registry, the response shaper against
//! assembled relations, and the scenario flows from the service
//! contract.

use ap_platform::module_group::ModuleGroup;
use ap_platform::module_permission::ModulePermission;
use ap_platform::role::detail::{LinkedModule, RoleWithRelations, shape_role_detail, shape_role_details};
use ap_platform::role::linker::link_role_permissions;
use ap_platform::role::{ModulePermissionGrant, Role, RoleModuleLink, RoleStatus};
use ap_platform::special_role::SpecialRole;
use ap_platform::Platform;

fn grant(module_id: &str, permissions: &[&str]) -> ModulePermissionGrant {
    ModulePermissionGrant {
        module_id: module_id.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
    }
}

// Scenario tests for the linker contract
mod linker_scenarios {
    use super::*;

    fn registry() -> Vec<ModulePermission> {
        vec![ModulePermission::new("M1", "Merchant", Platform::Stores)
            .with_group("g1")
            .with_sequence(1)
            .with_permissions(["read", "write", "delete"])]
    }

    #[test]
    fn create_manager_role_with_valid_subset_succeeds() {
        let registry = registry();
        let grants = vec![grant(&registry[0].id, &["read", "write"])];

        let links = link_role_permissions("role-manager", &grants, &registry).unwrap();

        assert_eq!(links.len(), 1);
        assert_eq!(links[0].active_permissions, vec!["read", "write"]);
    }

    #[test]
    fn unregistered_permission_fails_citing_code_and_offender() {
        let registry = registry();
        let grants = vec![grant(&registry[0].id, &["read", "execute"])];

        let err = link_role_permissions("role-manager", &grants, &registry).unwrap_err();

        assert_eq!(err.http_status_code(), 400);
        assert!(err.message().contains("execute"));
        assert!(err.message().contains("M1"));
    }

    #[test]
    fn validation_happens_before_any_link_is_produced() {
        let registry = registry();
        // first grant is fine, second is not; the whole batch must fail
        let grants = vec![
            grant(&registry[0].id, &["read"]),
            grant("unknown", &["read"]),
        ];

        assert!(link_role_permissions("role-manager", &grants, &registry).is_err());
    }
}

// Shaper round-trip per the service contract
mod shaper_scenarios {
    use super::*;

    fn assemble(
        role: &Role,
        entries: &[(&ModulePermission, &ModuleGroup, &[&str])],
        special_role: Option<SpecialRole>,
    ) -> RoleWithRelations {
        RoleWithRelations {
            role: role.clone(),
            links: entries
                .iter()
                .map(|(module, group, active)| LinkedModule {
                    link: RoleModuleLink::new(
                        &role.id,
                        &module.id,
                        active.iter().map(|p| p.to_string()).collect(),
                    ),
                    module: (*module).clone(),
                    group: (*group).clone(),
                })
                .collect(),
            special_role,
        }
    }

    #[test]
    fn two_modules_in_one_group_share_a_bucket() {
        let group = ModuleGroup::new("G1", Platform::Superadmin, 1);
        let module_a = ModulePermission::new("A", "Module A", Platform::Superadmin)
            .with_group(&group.id)
            .with_sequence(1)
            .with_permissions(["read", "write"]);
        let module_b = ModulePermission::new("B", "Module B", Platform::Superadmin)
            .with_group(&group.id)
            .with_sequence(2)
            .with_permissions(["read", "write"]);
        let role = Role::new("Manager", Platform::Superadmin, RoleStatus::Active);

        let loaded = assemble(
            &role,
            &[
                (&module_a, &group, &["read"]),
                (&module_b, &group, &["write"]),
            ],
            None,
        );

        let detail = shape_role_detail(&loaded);

        assert_eq!(detail.module_permissions.len(), 1);
        let bucket = &detail.module_permissions[0];
        assert_eq!(bucket.name, "G1");
        assert_eq!(bucket.modules.len(), 2);
        assert_eq!(bucket.modules[0].code, "A");
        assert_eq!(bucket.modules[0].active_permissions, vec!["read"]);
        assert_eq!(bucket.modules[1].code, "B");
        assert_eq!(bucket.modules[1].active_permissions, vec!["write"]);
    }

    #[test]
    fn batch_shaping_preserves_role_order() {
        let group = ModuleGroup::new("G1", Platform::Stores, 1);
        let module = ModulePermission::new("A", "Module A", Platform::Stores)
            .with_group(&group.id)
            .with_permissions(["read"]);

        let first = Role::new("Alpha", Platform::Stores, RoleStatus::Active);
        let second = Role::new("Beta", Platform::Stores, RoleStatus::Inactive);

        let loaded = vec![
            assemble(&second, &[(&module, &group, &["read"])], None),
            assemble(&first, &[], None),
        ];

        let details = shape_role_details(&loaded);
        assert_eq!(details[0].name, "Beta");
        assert_eq!(details[1].name, "Alpha");
        assert!(details[1].module_permissions.is_empty());
    }

    #[test]
    fn special_role_rides_along_without_timestamps() {
        let role = Role::new("Cashier", Platform::Stores, RoleStatus::Active);
        let mut special = SpecialRole::new("cashier", "Cashier", Platform::Stores);
        special.bind_role(&role.id);

        let loaded = assemble(&role, &[], Some(special));
        let detail = shape_role_detail(&loaded);

        let attached = detail.special_role.as_ref().expect("special role attached");
        assert_eq!(attached.code, "cashier");

        let json = serde_json::to_value(&detail).unwrap();
        let special_json = json.get("special_role").unwrap();
        assert!(special_json.get("created_at").is_none());
        assert!(special_json.get("deleted_at").is_none());
    }
}

// End-to-end pipeline: linker output feeds the shaper
mod pipeline {
    use super::*;

    #[test]
    fn linked_grants_shape_into_the_requested_tree() {
        let group = ModuleGroup::new("Kelola", Platform::Stores, 1);
        let registry = vec![
            ModulePermission::new("merchant", "Merchant", Platform::Stores)
                .with_group(&group.id)
                .with_sequence(1)
                .with_permissions(["read", "write", "delete"]),
            ModulePermission::new("voucher", "Voucher", Platform::Stores)
                .with_group(&group.id)
                .with_sequence(2)
                .with_permissions(["read", "approve"]),
        ];
        let role = Role::new("Supervisor", Platform::Stores, RoleStatus::Active);

        let grants = vec![
            grant(&registry[0].id, &["read", "write"]),
            grant(&registry[1].id, &["approve"]),
        ];
        let links = link_role_permissions(&role.id, &grants, &registry).unwrap();

        let loaded = RoleWithRelations {
            links: links
                .into_iter()
                .map(|link| {
                    let module = registry
                        .iter()
                        .find(|m| m.id == link.module_id)
                        .unwrap()
                        .clone();
                    LinkedModule {
                        link,
                        module,
                        group: group.clone(),
                    }
                })
                .collect(),
            special_role: None,
            role,
        };

        let detail = shape_role_detail(&loaded);

        assert_eq!(detail.module_permissions.len(), 1);
        let bucket = &detail.module_permissions[0];
        assert_eq!(bucket.modules.len(), 2);
        // active subsets survive the round trip; registered supersets
        // ride along for the admin UI
        assert_eq!(bucket.modules[0].active_permissions, vec!["read", "write"]);
        assert_eq!(bucket.modules[0].permissions, vec!["read", "write", "delete"]);
        assert_eq!(bucket.modules[1].active_permissions, vec!["approve"]);
    }
}

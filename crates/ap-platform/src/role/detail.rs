//! Role Detail Assembly and Response Shaping
//!
//! Reads return roles with their link rows eagerly loaded
//! (`link -> module -> group`, plus the bound special role). The shaper
//! then regroups the flat link rows into the nested tree consumed by
//! admin frontends: one bucket per module-group *name*, each bucket
//! carrying the modules with both the registered permission superset and
//! the role's active subset.
//!
//! Grouping is keyed by group name, not group id: two same-named groups
//! on one platform merge into a single bucket that carries the
//! first-encountered group's id/sequence/platform. This reproduces the
//! long-standing observable behavior of the service.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::module_group::entity::ModuleGroup;
use crate::module_group::repository::ModuleGroupRepository;
use crate::module_permission::entity::ModulePermission;
use crate::module_permission::repository::ModulePermissionRepository;
use crate::role::entity::{Role, RoleModuleLink, RoleStatus};
use crate::role::repository::RoleModuleLinkRepository;
use crate::shared::error::Result;
use crate::shared::platform::Platform;
use crate::special_role::entity::SpecialRole;
use crate::special_role::repository::SpecialRoleRepository;

/// One module inside a group bucket, combining the registered superset
/// with the role's active subset.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleItemResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub group_id: Option<String>,
    pub platform: Platform,
    pub sequence: i32,
    pub permissions: Vec<String>,
    pub active_permissions: Vec<String>,
}

/// A named group bucket of modules.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ModuleGroupResponse {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub sequence: i32,
    pub modules: Vec<ModuleItemResponse>,
}

/// Special role with internal timestamp fields stripped.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpecialRoleResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_id: Option<String>,
}

impl From<&SpecialRole> for SpecialRoleResponse {
    fn from(s: &SpecialRole) -> Self {
        Self {
            id: s.id.clone(),
            code: s.code.clone(),
            name: s.name.clone(),
            platform: s.platform,
            role_id: s.role_id.clone(),
        }
    }
}

/// Fully shaped role for external consumption.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleDetailResponse {
    pub id: String,
    pub name: String,
    pub status: RoleStatus,
    pub platform: Platform,
    pub module_permissions: Vec<ModuleGroupResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_role: Option<SpecialRoleResponse>,
}

/// A link row joined with its module and owning group.
#[derive(Debug, Clone)]
pub struct LinkedModule {
    pub link: RoleModuleLink,
    pub module: ModulePermission,
    pub group: ModuleGroup,
}

/// A role with every relation the shaper needs.
#[derive(Debug, Clone)]
pub struct RoleWithRelations {
    pub role: Role,
    pub links: Vec<LinkedModule>,
    pub special_role: Option<SpecialRole>,
}

/// Shape one eagerly loaded role into its nested response tree.
///
/// Two passes: first bucket the link rows by group name in input order
/// (an insertion-ordered map, so no reliance on hash iteration order),
/// then map each bucket to its response node. A role with zero links
/// yields an empty `module_permissions` list.
pub fn shape_role_detail(loaded: &RoleWithRelations) -> RoleDetailResponse {
    let mut buckets: IndexMap<&str, Vec<&LinkedModule>> = IndexMap::new();
    for linked in &loaded.links {
        buckets
            .entry(linked.group.name.as_str())
            .or_insert_with(Vec::new)
            .push(linked);
    }

    let module_permissions = buckets
        .into_iter()
        .map(|(_, bucket)| {
            let modules = bucket
                .iter()
                .map(|linked| ModuleItemResponse {
                    id: linked.module.id.clone(),
                    code: linked.module.code.clone(),
                    name: linked.module.name.clone(),
                    group_id: linked.module.group_id.clone(),
                    platform: linked.module.platform,
                    sequence: linked.module.sequence,
                    permissions: linked.module.permissions.clone(),
                    active_permissions: linked.link.active_permissions.clone(),
                })
                .collect();

            // Group metadata comes from the first link's group in the
            // bucket; platforms are assumed homogeneous within a bucket.
            let group = &bucket[0].group;
            ModuleGroupResponse {
                id: group.id.clone(),
                name: group.name.clone(),
                platform: group.platform,
                sequence: group.sequence,
                modules,
            }
        })
        .collect();

    RoleDetailResponse {
        id: loaded.role.id.clone(),
        name: loaded.role.name.clone(),
        status: loaded.role.status,
        platform: loaded.role.platform,
        module_permissions,
        special_role: loaded.special_role.as_ref().map(Into::into),
    }
}

/// Shape a batch of eagerly loaded roles, order-preserving.
pub fn shape_role_details(loaded: &[RoleWithRelations]) -> Vec<RoleDetailResponse> {
    loaded.iter().map(shape_role_detail).collect()
}

/// Relation ordering applied to a role's link rows before shaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOrdering {
    /// `(module.sequence, group.sequence)` ascending - the list variant.
    ByModuleSequence,
    /// `(group.sequence, module.sequence)` ascending - the detail variant.
    ByGroupSequence,
}

/// Loads the relation chain (`links -> module -> group`, special role)
/// for a set of roles with batch lookups instead of per-row queries.
#[derive(Clone)]
pub struct RoleDetailLoader {
    links: Arc<RoleModuleLinkRepository>,
    modules: Arc<ModulePermissionRepository>,
    groups: Arc<ModuleGroupRepository>,
    special_roles: Arc<SpecialRoleRepository>,
}

impl RoleDetailLoader {
    pub fn new(
        links: Arc<RoleModuleLinkRepository>,
        modules: Arc<ModulePermissionRepository>,
        groups: Arc<ModuleGroupRepository>,
        special_roles: Arc<SpecialRoleRepository>,
    ) -> Self {
        Self {
            links,
            modules,
            groups,
            special_roles,
        }
    }

    /// Eagerly load relations for the given roles, preserving their
    /// order. Links whose module or group cannot be resolved (for
    /// example a soft-deleted module still referenced by an old link)
    /// are skipped with a warning rather than failing the read.
    pub async fn load(
        &self,
        roles: Vec<Role>,
        ordering: LinkOrdering,
    ) -> Result<Vec<RoleWithRelations>> {
        let role_ids: Vec<String> = roles.iter().map(|r| r.id.clone()).collect();

        let links = self.links.find_by_role_ids(&role_ids).await?;

        let mut module_ids: Vec<String> = links.iter().map(|l| l.module_id.clone()).collect();
        module_ids.sort();
        module_ids.dedup();
        let modules: HashMap<String, ModulePermission> = self
            .modules
            .find_by_ids(&module_ids)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();

        let mut group_ids: Vec<String> = modules
            .values()
            .filter_map(|m| m.group_id.clone())
            .collect();
        group_ids.sort();
        group_ids.dedup();
        let groups: HashMap<String, ModuleGroup> = self
            .groups
            .find_by_ids(&group_ids)
            .await?
            .into_iter()
            .map(|g| (g.id.clone(), g))
            .collect();

        let special_roles: HashMap<String, SpecialRole> = self
            .special_roles
            .find_by_role_ids(&role_ids)
            .await?
            .into_iter()
            .filter_map(|s| s.role_id.clone().map(|rid| (rid, s)))
            .collect();

        let mut links_by_role: HashMap<String, Vec<LinkedModule>> = HashMap::new();
        for link in links {
            let Some(module) = modules.get(&link.module_id) else {
                warn!(
                    role_id = %link.role_id,
                    module_id = %link.module_id,
                    "Skipping link row: module not found or deleted"
                );
                continue;
            };
            let Some(group) = module.group_id.as_ref().and_then(|gid| groups.get(gid)) else {
                warn!(
                    role_id = %link.role_id,
                    module_id = %link.module_id,
                    "Skipping link row: module has no resolvable group"
                );
                continue;
            };
            links_by_role
                .entry(link.role_id.clone())
                .or_default()
                .push(LinkedModule {
                    link,
                    module: module.clone(),
                    group: group.clone(),
                });
        }

        let loaded = roles
            .into_iter()
            .map(|role| {
                let mut role_links = links_by_role.remove(&role.id).unwrap_or_default();
                sort_links(&mut role_links, ordering);
                let special_role = special_roles.get(&role.id).cloned();
                RoleWithRelations {
                    role,
                    links: role_links,
                    special_role,
                }
            })
            .collect();

        Ok(loaded)
    }
}

fn sort_links(links: &mut [LinkedModule], ordering: LinkOrdering) {
    match ordering {
        LinkOrdering::ByModuleSequence => {
            links.sort_by_key(|l| (l.module.sequence, l.group.sequence));
        }
        LinkOrdering::ByGroupSequence => {
            links.sort_by_key(|l| (l.group.sequence, l.module.sequence));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_group(name: &str, sequence: i32) -> ModuleGroup {
        ModuleGroup::new(name, Platform::Superadmin, sequence)
    }

    fn fixture_module(code: &str, group: &ModuleGroup, sequence: i32) -> ModulePermission {
        ModulePermission::new(code, code.to_uppercase(), Platform::Superadmin)
            .with_group(&group.id)
            .with_sequence(sequence)
            .with_permissions(["read", "write", "delete"])
    }

    fn linked(role: &Role, module: &ModulePermission, group: &ModuleGroup, active: &[&str]) -> LinkedModule {
        LinkedModule {
            link: RoleModuleLink::new(
                &role.id,
                &module.id,
                active.iter().map(|p| p.to_string()).collect(),
            ),
            module: module.clone(),
            group: group.clone(),
        }
    }

    #[test]
    fn test_same_group_buckets_together() {
        let role = Role::new("Manager", Platform::Superadmin, RoleStatus::Active);
        let group = fixture_group("Kelola", 1);
        let module_a = fixture_module("a", &group, 1);
        let module_b = fixture_module("b", &group, 2);

        let loaded = RoleWithRelations {
            links: vec![
                linked(&role, &module_a, &group, &["read"]),
                linked(&role, &module_b, &group, &["read", "write"]),
            ],
            special_role: None,
            role,
        };

        let detail = shape_role_detail(&loaded);

        assert_eq!(detail.module_permissions.len(), 1);
        let bucket = &detail.module_permissions[0];
        assert_eq!(bucket.name, "Kelola");
        assert_eq!(bucket.id, group.id);
        assert_eq!(bucket.modules.len(), 2);
        assert_eq!(bucket.modules[0].active_permissions, vec!["read"]);
        assert_eq!(bucket.modules[1].active_permissions, vec!["read", "write"]);
        // registered superset rides along untouched
        assert_eq!(bucket.modules[0].permissions, vec!["read", "write", "delete"]);
    }

    #[test]
    fn test_buckets_preserve_input_order() {
        let role = Role::new("Manager", Platform::Superadmin, RoleStatus::Active);
        let group_b = fixture_group("Beta", 2);
        let group_a = fixture_group("Alpha", 1);
        let module_b = fixture_module("b", &group_b, 1);
        let module_a = fixture_module("a", &group_a, 1);

        let loaded = RoleWithRelations {
            links: vec![
                linked(&role, &module_b, &group_b, &["read"]),
                linked(&role, &module_a, &group_a, &["read"]),
            ],
            special_role: None,
            role,
        };

        let detail = shape_role_detail(&loaded);

        // insertion order, not alphabetical or sequence order: ordering
        // is the loader's job
        assert_eq!(detail.module_permissions[0].name, "Beta");
        assert_eq!(detail.module_permissions[1].name, "Alpha");
    }

    #[test]
    fn test_same_named_groups_merge_into_first_groups_bucket() {
        let role = Role::new("Manager", Platform::Superadmin, RoleStatus::Active);
        let group_one = fixture_group("Kelola", 1);
        let group_two = fixture_group("Kelola", 9);
        let module_a = fixture_module("a", &group_one, 1);
        let module_b = fixture_module("b", &group_two, 2);

        let loaded = RoleWithRelations {
            links: vec![
                linked(&role, &module_a, &group_one, &["read"]),
                linked(&role, &module_b, &group_two, &["read"]),
            ],
            special_role: None,
            role,
        };

        let detail = shape_role_detail(&loaded);

        assert_eq!(detail.module_permissions.len(), 1);
        let bucket = &detail.module_permissions[0];
        assert_eq!(bucket.id, group_one.id);
        assert_eq!(bucket.sequence, 1);
        assert_eq!(bucket.modules.len(), 2);
    }

    #[test]
    fn test_zero_links_yields_empty_tree() {
        let role = Role::new("Empty", Platform::Stores, RoleStatus::Inactive);
        let loaded = RoleWithRelations {
            links: Vec::new(),
            special_role: None,
            role,
        };

        let detail = shape_role_detail(&loaded);
        assert!(detail.module_permissions.is_empty());
        assert!(detail.special_role.is_none());
    }

    #[test]
    fn test_special_role_attached_without_timestamps() {
        let role = Role::new("Manager", Platform::Stores, RoleStatus::Active);
        let mut special = SpecialRole::new("store-admin", "Store Admin", Platform::Stores);
        special.bind_role(&role.id);

        let loaded = RoleWithRelations {
            links: Vec::new(),
            special_role: Some(special.clone()),
            role,
        };

        let detail = shape_role_detail(&loaded);
        let attached = detail.special_role.unwrap();
        assert_eq!(attached.id, special.id);
        assert_eq!(attached.code, "store-admin");

        let json = serde_json::to_value(&attached).unwrap();
        assert!(json.get("created_at").is_none());
        assert!(json.get("updated_at").is_none());
    }

    #[test]
    fn test_sort_links_detail_variant() {
        let role = Role::new("Manager", Platform::Superadmin, RoleStatus::Active);
        let group_one = fixture_group("One", 1);
        let group_two = fixture_group("Two", 2);
        let module_late = fixture_module("late", &group_two, 1);
        let module_early = fixture_module("early", &group_one, 5);

        let mut links = vec![
            linked(&role, &module_late, &group_two, &["read"]),
            linked(&role, &module_early, &group_one, &["read"]),
        ];

        sort_links(&mut links, LinkOrdering::ByGroupSequence);
        assert_eq!(links[0].module.code, "early");

        sort_links(&mut links, LinkOrdering::ByModuleSequence);
        assert_eq!(links[0].module.code, "late");
    }
}

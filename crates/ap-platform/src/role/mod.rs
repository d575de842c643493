//! Role Aggregate
//!
//! Role lifecycle, the role-permission linker, and the response shaper.

pub mod entity;
pub mod repository;
pub mod linker;
pub mod detail;
pub mod operations;
pub mod api;

// Re-export main types
pub use entity::{Role, RoleStatus, RoleModuleLink};
pub use repository::{RoleRepository, RoleModuleLinkRepository};
pub use linker::{ModulePermissionGrant, link_role_permissions};
pub use detail::{RoleDetailLoader, RoleDetailResponse, RoleWithRelations};
pub use api::{RolesState, roles_router};

//! Module Permission Aggregate
//!
//! The permission registry: the authoritative supersets of grantable
//! permission strings, organized per platform.

pub mod entity;
pub mod repository;
pub mod api;

// Re-export main types
pub use entity::ModulePermission;
pub use repository::ModulePermissionRepository;
pub use api::{ModulePermissionsState, module_permissions_router};

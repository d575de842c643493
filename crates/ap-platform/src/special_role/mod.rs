//! Special Role Aggregate
//!
//! Platform-defined designations optionally bound to exactly one role.

pub mod entity;
pub mod repository;
pub mod api;

// Re-export main types
pub use entity::SpecialRole;
pub use repository::SpecialRoleRepository;
pub use api::{SpecialRolesState, special_roles_router, internal_router};

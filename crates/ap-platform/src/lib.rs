//! AuthPlane Platform
//!
//! Core domain crate for the AuthPlane authentication/authorization
//! service:
//! - RBAC administration: roles, permission modules, module groups, and
//!   special roles with hierarchical query and cascade-update semantics
//! - Role-permission linking with whole-batch validation against the
//!   permission registry
//! - OTP issuance/validation and JWT token handling
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Core aggregates
pub mod module_permission;
pub mod module_group;
pub mod role;
pub mod special_role;

// Authentication
pub mod auth;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;

// Re-export common types from shared
pub use shared::error::{AuthError, Result};
pub use shared::platform::Platform;

// Re-export use case infrastructure
pub use usecase::{UseCaseError, UnitOfWork, MongoUnitOfWork};
// Note: details! macro is automatically exported at crate root via #[macro_export]

// Re-export main entity types for convenience
pub use module_permission::ModulePermission;
pub use module_group::ModuleGroup;
pub use role::{Role, RoleStatus, RoleModuleLink, ModulePermissionGrant};
pub use special_role::SpecialRole;

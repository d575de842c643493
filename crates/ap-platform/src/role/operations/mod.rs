//! Role Operations
//!
//! Use cases for the role write pipeline: validate against the permission
//! registry, then commit atomically through the unit of work.

pub mod create;
pub mod update;
pub mod delete;

pub use create::{CreateRoleCommand, CreateRoleUseCase};
pub use update::{UpdateRoleCommand, UpdateRoleUseCase};
pub use delete::{DeleteRoleCommand, DeleteRoleUseCase};

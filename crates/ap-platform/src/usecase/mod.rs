//! Use Case Infrastructure
//!
//! Provides the foundational patterns for multi-step writes:
//! - `UseCaseError` - categorized error types for consistent handling
//! - `UnitOfWork` - atomic commit of a role together with its link rows

pub mod error;
pub mod unit_of_work;

pub use error::UseCaseError;
pub use unit_of_work::{UnitOfWork, MongoUnitOfWork};

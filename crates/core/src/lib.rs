//! `rolegate-core`: identifiers and error primitives shared by every crate.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod entity;
pub mod error;
pub mod id;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{PermissionId, RoleId, UserId};

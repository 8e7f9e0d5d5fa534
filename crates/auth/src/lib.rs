//! `rolegate-auth`: role-based access control core.
//!
//! Turns a user's flat role/permission rows into API-path decisions and a
//! navigation tree.
//!
//! This crate is decoupled from HTTP and storage; records arrive through the
//! [`AssignmentStore`] port.

pub mod aggregator;
pub mod authorize;
pub mod menu;
pub mod permissions;
pub mod record;
pub mod roles;
pub mod service;
pub mod store;
pub mod user;

pub use aggregator::{
    DEFAULT_FAN_OUT_THRESHOLD, MAX_FAN_OUT_WORKERS, PartitionedPermissions, PermissionAggregator, PermissionSet,
};
pub use authorize::AuthorizationChecker;
pub use menu::{MAX_MENU_DEPTH, MenuNode, MenuTreeBuilder, SortDirection, TreeReport};
pub use permissions::{Permission, PermissionType};
pub use record::FlatAssignmentRecord;
pub use roles::Role;
pub use service::AccessService;
pub use store::{AssignmentStore, StoreError};
pub use user::User;

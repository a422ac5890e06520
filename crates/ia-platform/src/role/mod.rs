//! Role Aggregate

pub mod entity;
pub mod repository;

pub use entity::Role;
pub use repository::{MongoRoleStore, RoleStore, ROLES_COLLECTION};

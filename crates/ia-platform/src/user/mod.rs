//! User Aggregate
//!
//! Registered users with role memberships and claims.

pub mod entity;
pub mod repository;

pub use entity::{normalize_email, User, UserClaim};
pub use repository::{MongoUserStore, UserStore, USERS_COLLECTION};

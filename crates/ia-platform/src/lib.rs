//! Access Admin Platform
//!
//! Identity and access administration:
//! - Role catalogue (create, list)
//! - Role membership for users (assign, revoke, query)
//! - User claims (attach, query)
//! - Audit trail of every mutation
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Store trait and MongoDB backend
//!
//! `access` holds the administration service and its REST endpoints.

// Aggregates
pub mod user;
pub mod role;
pub mod audit;

// Administration
pub mod access;

// Persistence plumbing
pub mod store;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

pub use shared::error::{PlatformError, Result};
pub use shared::tsid::TsidGenerator;

pub use usecase::{ExecutionContext, TracingContext};

pub use user::{MongoUserStore, User, UserClaim, UserStore};
pub use role::{MongoRoleStore, Role, RoleStore};
pub use audit::{
    AuditAction, AuditLog, AuditLogRepository, AuditService, InMemoryAuditLogRepository,
    MongoAuditLogRepository,
};
pub use store::{InMemoryRoleStore, InMemoryUserStore, StoreError, StoreResult};

pub use access::{
    AccessAdminService, AccessError, AccessState, AddClaimCommand, AssignRoleCommand, Change,
    CreateRoleCommand, ErrorKind, FailureKind, RemoveRoleCommand,
};

pub use seed::{DevDataSeeder, SeedReport};

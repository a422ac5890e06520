//! Access Administration
//!
//! Role creation, role membership and claim management for users.

pub mod api;
pub mod commands;
pub mod error;
pub mod service;

pub use api::{access_router, build_app, AccessState, ACCESS_BASE_PATH};
pub use commands::{AddClaimCommand, AssignRoleCommand, CreateRoleCommand, RemoveRoleCommand};
pub use error::{AccessError, ErrorKind, FailureKind};
pub use service::{AccessAdminService, Change};

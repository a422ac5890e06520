//! Audit Aggregate
//!
//! Trail of who changed which user or role, and when.

pub mod entity;
pub mod repository;
pub mod service;

pub use entity::{AuditAction, AuditLog};
pub use repository::{
    AuditLogRepository, InMemoryAuditLogRepository, MongoAuditLogRepository,
    AUDIT_LOGS_COLLECTION,
};
pub use service::AuditService;

//! Audit Service
//!
//! Records successful mutations. Recording is best-effort: a failed
//! insert is logged and never fails the mutation it describes.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};

use super::entity::{AuditAction, AuditLog};
use super::repository::AuditLogRepository;
use crate::store::StoreResult;
use crate::usecase::ExecutionContext;

#[derive(Clone)]
pub struct AuditService {
    repo: Arc<dyn AuditLogRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<dyn AuditLogRepository>) -> Self {
        Self { repo }
    }

    /// Record `command` as the operation that performed `action` on the entity.
    pub async fn record<C: Serialize>(
        &self,
        ctx: &ExecutionContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        command: &C,
    ) {
        let operation_json = match serde_json::to_string(command) {
            Ok(json) => Some(json),
            Err(e) => {
                warn!(error = %e, "Failed to serialize audited command");
                None
            }
        };

        let log = AuditLog::new(
            ctx,
            action,
            entity_type,
            entity_id,
            command_name::<C>(),
            operation_json,
        );

        match self.repo.insert(&log).await {
            Ok(()) => debug!(audit_id = %log.id, ?action, entity_id, "Audit entry recorded"),
            Err(e) => warn!(error = %e, ?action, entity_id, "Failed to record audit entry"),
        }
    }

    pub async fn history(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<AuditLog>> {
        self.repo.find_by_entity(entity_type, entity_id, limit).await
    }
}

/// Last path segment of the type name, e.g. "CreateRoleCommand"
fn command_name<C>() -> &'static str {
    let full = std::any::type_name::<C>();
    full.rsplit("::").next().unwrap_or(full)
}

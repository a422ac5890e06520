//! Audit Log Entity
//!
//! One entry per successful administration mutation.

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::tsid::TsidGenerator;
use crate::usecase::ExecutionContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    RoleCreated,
    RoleAssigned,
    RoleUnassigned,
    ClaimAdded,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: String,

    pub action: AuditAction,

    /// "User" or "Role"
    pub entity_type: String,

    /// User email or role name
    pub entity_id: String,

    /// Command name, e.g. "AssignRoleCommand"
    pub operation: String,

    /// Command payload as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    pub principal_id: String,

    pub execution_id: String,

    pub correlation_id: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        ctx: &ExecutionContext,
        action: AuditAction,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        operation: impl Into<String>,
        operation_json: Option<String>,
    ) -> Self {
        Self {
            id: TsidGenerator::generate(),
            action,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            operation: operation.into(),
            operation_json,
            principal_id: ctx.principal_id.clone(),
            execution_id: ctx.execution_id.clone(),
            correlation_id: ctx.correlation_id.clone(),
            performed_at: Utc::now(),
        }
    }
}

//! Commands for the mutating administration operations.
//!
//! Each command is also the payload recorded in the audit trail.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleCommand {
    pub name: String,
}

impl CreateRoleCommand {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRoleCommand {
    pub email: String,
    pub role_name: String,
}

impl AssignRoleCommand {
    pub fn new(email: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role_name: role_name.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClaimCommand {
    pub email: String,
    pub claim_type: String,
    pub claim_value: String,
}

impl AddClaimCommand {
    pub fn new(
        email: impl Into<String>,
        claim_type: impl Into<String>,
        claim_value: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            claim_type: claim_type.into(),
            claim_value: claim_value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveRoleCommand {
    pub email: String,
    pub role_name: String,
}

impl RemoveRoleCommand {
    pub fn new(email: impl Into<String>, role_name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            role_name: role_name.into(),
        }
    }
}

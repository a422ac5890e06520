//! User Entity
//!
//! A registered account with its role memberships and claims.

use std::collections::BTreeSet;

use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::tsid::TsidGenerator;

/// Canonical form used to look users up by email.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A (type, value) pair attached to a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,

    pub email: String,

    /// Lowercased, trimmed email; unique per store
    pub normalized_email: String,

    pub user_name: String,

    #[serde(default)]
    pub email_confirmed: bool,

    /// Names of the roles this user is a member of
    #[serde(default)]
    pub roles: BTreeSet<String>,

    /// Claims in insertion order, never two equal pairs
    #[serde(default)]
    pub claims: Vec<UserClaim>,

    /// Never leaves the store
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// New user whose user name is the email, as registration does it.
    pub fn new(email: impl Into<String>) -> Self {
        let email = email.into();
        let now = Utc::now();
        Self {
            id: TsidGenerator::generate(),
            normalized_email: normalize_email(&email),
            user_name: email.clone(),
            email,
            email_confirmed: false,
            roles: BTreeSet::new(),
            claims: Vec::new(),
            password_hash: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = user_name.into();
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.email_confirmed = true;
        self
    }

    pub fn has_role(&self, role_name: &str) -> bool {
        self.roles.contains(role_name)
    }

    pub fn has_claim(&self, claim: &UserClaim) -> bool {
        self.claims.contains(claim)
    }

    /// Returns false if the role was already held.
    pub fn add_role(&mut self, role_name: &str) -> bool {
        let added = self.roles.insert(role_name.to_string());
        if added {
            self.updated_at = Utc::now();
        }
        added
    }

    /// Returns false if the role was not held.
    pub fn remove_role(&mut self, role_name: &str) -> bool {
        let removed = self.roles.remove(role_name);
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Returns false if an equal claim is already attached.
    pub fn add_claim(&mut self, claim: UserClaim) -> bool {
        if self.has_claim(&claim) {
            return false;
        }
        self.claims.push(claim);
        self.updated_at = Utc::now();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user() {
        let user = User::new("Alice@Acme.local");
        assert_eq!(user.normalized_email, "alice@acme.local");
        assert_eq!(user.user_name, "Alice@Acme.local");
        assert!(user.roles.is_empty());
        assert_eq!(normalize_email(" alice@acme.LOCAL "), user.normalized_email);
    }

    #[test]
    fn test_role_membership_is_a_set() {
        let mut user = User::new("bob@acme.local");
        assert!(user.add_role("Admin"));
        assert!(!user.add_role("Admin"));
        assert!(user.has_role("Admin"));
        assert!(!user.has_role("admin"));

        assert!(user.remove_role("Admin"));
        assert!(!user.remove_role("Admin"));
    }

    #[test]
    fn test_claims_deduplicated() {
        let mut user = User::new("bob@acme.local");
        assert!(user.add_claim(UserClaim::new("department", "Finance")));
        assert!(!user.add_claim(UserClaim::new("department", "Finance")));
        assert!(user.add_claim(UserClaim::new("department", "Sales")));
        assert_eq!(user.claims.len(), 2);
    }

    #[test]
    fn test_password_hash_not_serialized_when_absent() {
        let user = User::new("Bob@Acme.local");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["normalizedEmail"], "bob@acme.local");
    }
}

//! In-memory stores
//!
//! Process-local backends on `DashMap`. Each write runs under the shard
//! lock of the key it touches, so a check-and-set on one user or one role
//! name is atomic.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use super::{StoreError, StoreResult};
use crate::role::{Role, RoleStore};
use crate::user::{normalize_email, User, UserClaim, UserStore};

/// Users keyed by normalized email
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<String, User>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Apply `f` to the stored copy of `user`. The id must still match, a
    /// user re-registered under the same email is a different user.
    fn update<T>(&self, user: &User, f: impl FnOnce(&mut User) -> T) -> StoreResult<T> {
        match self.users.get_mut(&user.normalized_email) {
            Some(mut stored) if stored.id == user.id => Ok(f(&mut stored)),
            _ => Err(StoreError::not_found("User", &user.email)),
        }
    }

    fn read<T>(&self, user: &User, f: impl FnOnce(&User) -> T) -> StoreResult<T> {
        match self.users.get(&user.normalized_email) {
            Some(stored) if stored.id == user.id => Ok(f(&stored)),
            _ => Err(StoreError::not_found("User", &user.email)),
        }
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .get(&normalize_email(email))
            .map(|u| u.value().clone()))
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let mut users: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        users.sort_by(|a, b| a.normalized_email.cmp(&b.normalized_email));
        Ok(users)
    }

    async fn add_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        self.update(user, |u| u.add_role(role_name))
    }

    async fn remove_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        self.update(user, |u| u.remove_role(role_name))
    }

    async fn add_claim(&self, user: &User, claim: &UserClaim) -> StoreResult<bool> {
        self.update(user, |u| u.add_claim(claim.clone()))
    }

    async fn get_roles(&self, user: &User) -> StoreResult<Vec<String>> {
        self.read(user, |u| u.roles.iter().cloned().collect())
    }

    async fn get_claims(&self, user: &User) -> StoreResult<Vec<UserClaim>> {
        self.read(user, |u| u.claims.clone())
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        match self.users.entry(user.normalized_email.clone()) {
            Entry::Occupied(_) => Err(StoreError::conflict("User", &user.email)),
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
                Ok(())
            }
        }
    }
}

/// Roles keyed by exact name
#[derive(Debug, Default)]
pub struct InMemoryRoleStore {
    roles: DashMap<String, Role>,
}

impl InMemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

#[async_trait]
impl RoleStore for InMemoryRoleStore {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.roles.contains_key(name))
    }

    async fn create(&self, role: &Role) -> StoreResult<()> {
        match self.roles.entry(role.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::conflict("Role", &role.name)),
            Entry::Vacant(slot) => {
                slot.insert(role.clone());
                Ok(())
            }
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Role>> {
        let mut roles: Vec<Role> = self.roles.iter().map(|r| r.value().clone()).collect();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }
}

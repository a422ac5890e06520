//! Shared fixtures: seeded in-memory stores and a user store wrapper that
//! can fail, stall or count writes on demand.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ia_platform::{
    AccessAdminService, AuditLog, AuditLogRepository, InMemoryRoleStore, InMemoryUserStore,
    Role, RoleStore, StoreError, StoreResult, User, UserClaim, UserStore,
};

pub const BOB: &str = "bob@x.com";
pub const ALICE: &str = "alice@x.com";

/// In-memory user store with switchable faults
#[derive(Default)]
pub struct FaultyUserStore {
    inner: InMemoryUserStore,
    pub reject_writes: AtomicBool,
    /// Writes find the user gone, as if deleted after the lookup
    pub vanish_on_write: AtomicBool,
    pub fail_reads: AtomicBool,
    pub writes: AtomicUsize,
    pub read_delay: Option<Duration>,
    pub write_delay: Option<Duration>,
}

impl FaultyUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    async fn before_read(&self) -> StoreResult<()> {
        if let Some(delay) = self.read_delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection refused".into()));
        }
        Ok(())
    }

    async fn before_write(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::rejected("store is read-only"));
        }
        if self.vanish_on_write.load(Ordering::SeqCst) {
            return Err(StoreError::not_found("User", "vanished"));
        }
        Ok(())
    }
}

#[async_trait]
impl UserStore for FaultyUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        self.before_read().await?;
        self.inner.find_by_email(email).await
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        self.before_read().await?;
        self.inner.list_all().await
    }

    async fn add_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        self.before_write().await?;
        self.inner.add_role(user, role_name).await
    }

    async fn remove_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        self.before_write().await?;
        self.inner.remove_role(user, role_name).await
    }

    async fn add_claim(&self, user: &User, claim: &UserClaim) -> StoreResult<bool> {
        self.before_write().await?;
        self.inner.add_claim(user, claim).await
    }

    async fn get_roles(&self, user: &User) -> StoreResult<Vec<String>> {
        self.before_read().await?;
        self.inner.get_roles(user).await
    }

    async fn get_claims(&self, user: &User) -> StoreResult<Vec<UserClaim>> {
        self.before_read().await?;
        self.inner.get_claims(user).await
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        self.inner.insert(user).await
    }
}

/// Role store whose inserts always fail
#[derive(Default)]
pub struct BrokenRoleStore {
    inner: InMemoryRoleStore,
}

#[async_trait]
impl RoleStore for BrokenRoleStore {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        self.inner.exists(name).await
    }

    async fn create(&self, _role: &Role) -> StoreResult<()> {
        Err(StoreError::Backend("disk full".into()))
    }

    async fn list_all(&self) -> StoreResult<Vec<Role>> {
        self.inner.list_all().await
    }
}

/// Audit sink that refuses every entry
pub struct FailingAuditRepository;

#[async_trait]
impl AuditLogRepository for FailingAuditRepository {
    async fn insert(&self, _log: &AuditLog) -> StoreResult<()> {
        Err(StoreError::Backend("audit sink offline".into()))
    }

    async fn find_by_entity(&self, _: &str, _: &str, _: usize) -> StoreResult<Vec<AuditLog>> {
        Ok(Vec::new())
    }
}

pub async fn seed_users(store: &dyn UserStore, emails: &[&str]) {
    for email in emails {
        store.insert(&User::new(*email)).await.unwrap();
    }
}

pub async fn seed_roles(store: &dyn RoleStore, names: &[&str]) {
    for name in names {
        store.create(&Role::new(*name)).await.unwrap();
    }
}

/// Service over fresh in-memory stores holding bob and alice and no roles
pub async fn memory_service() -> (AccessAdminService, Arc<InMemoryUserStore>, Arc<InMemoryRoleStore>) {
    let users = Arc::new(InMemoryUserStore::new());
    let roles = Arc::new(InMemoryRoleStore::new());
    seed_users(users.as_ref(), &[BOB, ALICE]).await;

    let service = AccessAdminService::new(users.clone(), roles.clone());
    (service, users, roles)
}

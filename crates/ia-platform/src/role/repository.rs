//! Role Store

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::entity::Role;
use crate::store::error::is_duplicate_key;
use crate::store::{StoreError, StoreResult};

pub const ROLES_COLLECTION: &str = "roles";

/// Storage for the global role catalogue.
#[async_trait]
pub trait RoleStore: Send + Sync {
    async fn exists(&self, name: &str) -> StoreResult<bool>;

    /// `Conflict` if a role with the same name already exists.
    async fn create(&self, role: &Role) -> StoreResult<()>;

    async fn list_all(&self) -> StoreResult<Vec<Role>>;
}

/// MongoDB-backed role store; relies on the unique index on `name`.
pub struct MongoRoleStore {
    collection: Collection<Role>,
}

impl MongoRoleStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(ROLES_COLLECTION),
        }
    }
}

#[async_trait]
impl RoleStore for MongoRoleStore {
    async fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.collection.count_documents(doc! { "name": name }).await? > 0)
    }

    async fn create(&self, role: &Role) -> StoreResult<()> {
        match self.collection.insert_one(role).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::conflict("Role", &role.name)),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_all(&self) -> StoreResult<Vec<Role>> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }
}

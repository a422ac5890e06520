//! Audit Log Repository

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{bson::doc, options::FindOptions, Collection, Database};
use tokio::sync::RwLock;

use super::entity::AuditLog;
use crate::store::StoreResult;

pub const AUDIT_LOGS_COLLECTION: &str = "audit_logs";

#[async_trait]
pub trait AuditLogRepository: Send + Sync {
    async fn insert(&self, log: &AuditLog) -> StoreResult<()>;

    /// Newest first
    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<AuditLog>>;
}

pub struct MongoAuditLogRepository {
    collection: Collection<AuditLog>,
}

impl MongoAuditLogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(AUDIT_LOGS_COLLECTION),
        }
    }
}

#[async_trait]
impl AuditLogRepository for MongoAuditLogRepository {
    async fn insert(&self, log: &AuditLog) -> StoreResult<()> {
        self.collection.insert_one(log).await?;
        Ok(())
    }

    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<AuditLog>> {
        let options = FindOptions::builder()
            .sort(doc! { "performedAt": -1, "_id": -1 })
            .limit(limit as i64)
            .build();

        let cursor = self
            .collection
            .find(doc! { "entityType": entity_type, "entityId": entity_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }
}

/// Append-only log kept in process memory
#[derive(Debug, Default)]
pub struct InMemoryAuditLogRepository {
    logs: RwLock<Vec<AuditLog>>,
}

impl InMemoryAuditLogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.logs.read().await.len()
    }
}

#[async_trait]
impl AuditLogRepository for InMemoryAuditLogRepository {
    async fn insert(&self, log: &AuditLog) -> StoreResult<()> {
        self.logs.write().await.push(log.clone());
        Ok(())
    }

    async fn find_by_entity(
        &self,
        entity_type: &str,
        entity_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<AuditLog>> {
        let logs = self.logs.read().await;
        Ok(logs
            .iter()
            .rev()
            .filter(|l| l.entity_type == entity_type && l.entity_id == entity_id)
            .take(limit)
            .cloned()
            .collect())
    }
}

//! User Store
//!
//! Persistence boundary for users. Email lookups are case-insensitive.

use async_trait::async_trait;
use bson::doc;
use futures::TryStreamExt;
use mongodb::{Collection, Database};

use super::entity::{normalize_email, User, UserClaim};
use crate::store::error::is_duplicate_key;
use crate::store::{StoreError, StoreResult};

pub const USERS_COLLECTION: &str = "users";

/// Storage for users, their role memberships and claims.
///
/// Writes are keyed by the user's id and applied atomically, so a
/// concurrent writer can never lose an update. They return whether
/// anything changed, and `NotFound` if the user no longer exists.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    async fn list_all(&self) -> StoreResult<Vec<User>>;

    async fn add_role(&self, user: &User, role_name: &str) -> StoreResult<bool>;

    async fn remove_role(&self, user: &User, role_name: &str) -> StoreResult<bool>;

    async fn add_claim(&self, user: &User, claim: &UserClaim) -> StoreResult<bool>;

    async fn get_roles(&self, user: &User) -> StoreResult<Vec<String>>;

    async fn get_claims(&self, user: &User) -> StoreResult<Vec<UserClaim>>;

    /// Provisioning hook; `Conflict` if the email is taken.
    async fn insert(&self, user: &User) -> StoreResult<()>;
}

/// MongoDB-backed user store
pub struct MongoUserStore {
    collection: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<User>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn exists(&self, id: &str) -> StoreResult<bool> {
        Ok(self.collection.count_documents(doc! { "_id": id }).await? > 0)
    }

    /// Resolve a conditional update that matched nothing: either the user is
    /// gone, or the guard held because there was nothing to change.
    async fn unchanged_or_missing(&self, user: &User) -> StoreResult<bool> {
        if self.exists(&user.id).await? {
            Ok(false)
        } else {
            Err(StoreError::not_found("User", &user.email))
        }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .collection
            .find_one(doc! { "normalizedEmail": normalize_email(email) })
            .await?)
    }

    async fn list_all(&self) -> StoreResult<Vec<User>> {
        let cursor = self
            .collection
            .find(doc! {})
            .sort(doc! { "normalizedEmail": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn add_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": user.id.as_str(), "roles": { "$ne": role_name } },
                doc! {
                    "$push": { "roles": role_name },
                    "$set": { "updatedAt": bson::DateTime::now() },
                },
            )
            .await?;

        if result.matched_count == 0 {
            return self.unchanged_or_missing(user).await;
        }
        Ok(true)
    }

    async fn remove_role(&self, user: &User, role_name: &str) -> StoreResult<bool> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": user.id.as_str(), "roles": role_name },
                doc! {
                    "$pull": { "roles": role_name },
                    "$set": { "updatedAt": bson::DateTime::now() },
                },
            )
            .await?;

        if result.matched_count == 0 {
            return self.unchanged_or_missing(user).await;
        }
        Ok(true)
    }

    async fn add_claim(&self, user: &User, claim: &UserClaim) -> StoreResult<bool> {
        let claim_doc = bson::to_document(claim)?;
        let result = self
            .collection
            .update_one(
                doc! {
                    "_id": user.id.as_str(),
                    "claims": { "$not": { "$elemMatch": {
                        "type": claim.claim_type.as_str(),
                        "value": claim.value.as_str(),
                    } } },
                },
                doc! {
                    "$push": { "claims": claim_doc },
                    "$set": { "updatedAt": bson::DateTime::now() },
                },
            )
            .await?;

        if result.matched_count == 0 {
            return self.unchanged_or_missing(user).await;
        }
        Ok(true)
    }

    async fn get_roles(&self, user: &User) -> StoreResult<Vec<String>> {
        self.find_by_id(&user.id)
            .await?
            .map(|u| u.roles.into_iter().collect())
            .ok_or_else(|| StoreError::not_found("User", &user.email))
    }

    async fn get_claims(&self, user: &User) -> StoreResult<Vec<UserClaim>> {
        self.find_by_id(&user.id)
            .await?
            .map(|u| u.claims)
            .ok_or_else(|| StoreError::not_found("User", &user.email))
    }

    async fn insert(&self, user: &User) -> StoreResult<()> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::conflict("User", &user.email)),
            Err(e) => Err(e.into()),
        }
    }
}

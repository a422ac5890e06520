//! MongoDB index initialization
//!
//! The unique indexes back the uniqueness guarantees of the Mongo stores:
//! a duplicate insert fails with E11000 and surfaces as `Conflict`.

use mongodb::{bson::doc, options::IndexOptions, Database, IndexModel};
use tracing::info;

use crate::audit::repository::AUDIT_LOGS_COLLECTION;
use crate::shared::error::Result;
use crate::role::ROLES_COLLECTION;
use crate::user::USERS_COLLECTION;

pub async fn initialize_indexes(db: &Database) -> Result<()> {
    info!("Initializing MongoDB indexes...");

    let users = db.collection::<mongodb::bson::Document>(USERS_COLLECTION);
    users
        .create_index(
            IndexModel::builder()
                .keys(doc! { "normalizedEmail": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("uniq_normalized_email".to_string())
                        .build(),
                )
                .build(),
        )
        .await?;

    let roles = db.collection::<mongodb::bson::Document>(ROLES_COLLECTION);
    roles
        .create_index(
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(
                    IndexOptions::builder()
                        .unique(true)
                        .name("uniq_role_name".to_string())
                        .build(),
                )
                .build(),
        )
        .await?;

    let audit_logs = db.collection::<mongodb::bson::Document>(AUDIT_LOGS_COLLECTION);
    audit_logs
        .create_index(
            IndexModel::builder()
                .keys(doc! { "entityType": 1, "entityId": 1, "performedAt": -1 })
                .build(),
        )
        .await?;

    info!("MongoDB indexes initialized");
    Ok(())
}

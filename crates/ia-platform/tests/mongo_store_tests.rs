//! MongoDB store tests
//!
//! Run against a throwaway container; ignored by default because they
//! need a Docker daemon. `cargo test -- --ignored` runs them.

use std::sync::Arc;

use testcontainers::runners::AsyncRunner;
use testcontainers::ContainerAsync;
use testcontainers_modules::mongo::Mongo;

use ia_platform::store::initialize_indexes;
use ia_platform::{MongoRoleStore, MongoUserStore, Role, RoleStore, StoreError, User, UserClaim, UserStore};

async fn start_mongo() -> (ContainerAsync<Mongo>, mongodb::Database) {
    let node = Mongo::default().start().await.unwrap();
    let port = node.get_host_port_ipv4(27017).await.unwrap();
    let client = mongodb::Client::with_uri_str(format!("mongodb://127.0.0.1:{}", port))
        .await
        .unwrap();
    let db = client.database("access_admin_test");
    initialize_indexes(&db).await.unwrap();
    (node, db)
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_role_membership_guards() {
    let (_node, db) = start_mongo().await;
    let users = MongoUserStore::new(&db);
    let bob = User::new("Bob@X.com");
    users.insert(&bob).await.unwrap();

    assert!(users.add_role(&bob, "Admin").await.unwrap());
    assert!(!users.add_role(&bob, "Admin").await.unwrap());
    assert_eq!(users.get_roles(&bob).await.unwrap(), vec!["Admin".to_string()]);

    assert!(users.remove_role(&bob, "Admin").await.unwrap());
    assert!(!users.remove_role(&bob, "Admin").await.unwrap());
    assert!(users.get_roles(&bob).await.unwrap().is_empty());
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_racing_writes_store_one_copy() {
    let (_node, db) = start_mongo().await;
    let users = Arc::new(MongoUserStore::new(&db));
    let bob = User::new("bob@x.com");
    users.insert(&bob).await.unwrap();
    let claim = UserClaim::new("department", "Finance");

    let mut handles = Vec::new();
    for _ in 0..8 {
        let users = Arc::clone(&users);
        let bob = bob.clone();
        let claim = claim.clone();
        handles.push(tokio::spawn(async move {
            let role = users.add_role(&bob, "Admin").await.unwrap();
            let claimed = users.add_claim(&bob, &claim).await.unwrap();
            (role, claimed)
        }));
    }

    let mut roles_applied = 0;
    let mut claims_applied = 0;
    for handle in handles {
        let (role, claimed) = handle.await.unwrap();
        roles_applied += role as usize;
        claims_applied += claimed as usize;
    }

    assert_eq!(roles_applied, 1);
    assert_eq!(claims_applied, 1);
    assert_eq!(users.get_claims(&bob).await.unwrap(), vec![claim]);
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_write_against_missing_user_is_not_found() {
    let (_node, db) = start_mongo().await;
    let users = MongoUserStore::new(&db);
    let ghost = User::new("ghost@x.com");

    let err = users.add_role(&ghost, "Admin").await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));

    let err = users
        .add_claim(&ghost, &UserClaim::new("department", "Finance"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[tokio::test]
#[ignore = "requires docker"]
async fn test_unique_indexes_surface_as_conflict() {
    let (_node, db) = start_mongo().await;
    let users = MongoUserStore::new(&db);
    let roles = MongoRoleStore::new(&db);

    users.insert(&User::new("bob@x.com")).await.unwrap();
    let err = users.insert(&User::new("BOB@x.com")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));

    roles.create(&Role::new("Admin")).await.unwrap();
    let err = roles.create(&Role::new("Admin")).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
    assert!(roles.exists("Admin").await.unwrap());
}

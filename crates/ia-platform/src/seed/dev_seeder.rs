//! Development Data Seeder
//!
//! Seeds a small, predictable data set when the server runs in dev mode.
//! Entities that already exist are left alone, so seeding is safe to
//! repeat against a persistent store.
//!
//!   Platform Admin: admin@access.local (role Admin)
//!   Regular Users:  alice@acme.local, bob@acme.local (role AppUser)

use std::sync::Arc;

use tracing::info;

use crate::role::{Role, RoleStore};
use crate::shared::error::Result;
use crate::store::StoreError;
use crate::usecase::SYSTEM_PRINCIPAL;
use crate::user::{User, UserStore};

pub const ADMIN_ROLE: &str = "Admin";
pub const APP_USER_ROLE: &str = "AppUser";

const DEV_USERS: &[(&str, &str)] = &[
    ("admin@access.local", ADMIN_ROLE),
    ("alice@acme.local", APP_USER_ROLE),
    ("bob@acme.local", APP_USER_ROLE),
];

/// What a seeding run actually created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub users_created: usize,
}

pub struct DevDataSeeder {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
}

impl DevDataSeeder {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self { users, roles }
    }

    pub async fn seed(&self) -> Result<SeedReport> {
        info!("=== DEV DATA SEEDER ===");

        let mut report = SeedReport::default();
        for name in [ADMIN_ROLE, APP_USER_ROLE] {
            if self.seed_role(name).await? {
                report.roles_created += 1;
            }
        }
        for (email, role) in DEV_USERS {
            if self.seed_user(email, role).await? {
                report.users_created += 1;
            }
        }

        info!(
            roles_created = report.roles_created,
            users_created = report.users_created,
            "Development data seeded"
        );
        Ok(report)
    }

    async fn seed_role(&self, name: &str) -> Result<bool> {
        if self.roles.exists(name).await? {
            return Ok(false);
        }
        match self.roles.create(&Role::new(name).created_by(SYSTEM_PRINCIPAL)).await {
            Ok(()) => {
                info!(role = name, "Created dev role");
                Ok(true)
            }
            Err(StoreError::Conflict { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn seed_user(&self, email: &str, role: &str) -> Result<bool> {
        if self.users.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        let user = User::new(email).confirmed();
        match self.users.insert(&user).await {
            Ok(()) => {}
            Err(StoreError::Conflict { .. }) => return Ok(false),
            Err(e) => return Err(e.into()),
        }
        self.users.add_role(&user, role).await?;

        info!(email, role, "Created dev user");
        Ok(true)
    }
}

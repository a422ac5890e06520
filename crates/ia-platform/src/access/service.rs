//! Access Administration Service
//!
//! Role and claim administration over a `UserStore` and a `RoleStore`.
//!
//! Every operation checks its input and the existence of the user and role
//! before issuing a single conditional write. The cancellation token in the
//! `ExecutionContext` is honoured up to the moment the write is dispatched.
//! From then on the write runs on its own task, so dropping the caller
//! cannot leave it half-applied.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn, Instrument};

use super::commands::{AddClaimCommand, AssignRoleCommand, CreateRoleCommand, RemoveRoleCommand};
use super::error::{AccessError, FailureKind};
use crate::audit::{AuditAction, AuditService};
use crate::role::{Role, RoleStore};
use crate::store::{StoreError, StoreResult};
use crate::usecase::ExecutionContext;
use crate::user::{User, UserClaim, UserStore};

/// Outcome of an idempotent mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Applied,
    /// The store already held the requested state
    Unchanged,
}

impl Change {
    pub fn is_applied(&self) -> bool {
        matches!(self, Change::Applied)
    }
}

impl From<bool> for Change {
    fn from(changed: bool) -> Self {
        if changed {
            Change::Applied
        } else {
            Change::Unchanged
        }
    }
}

/// Stateless and cheap to clone; all shared state lives in the stores.
#[derive(Clone)]
pub struct AccessAdminService {
    users: Arc<dyn UserStore>,
    roles: Arc<dyn RoleStore>,
    audit: Option<AuditService>,
    read_timeout: Option<Duration>,
}

impl AccessAdminService {
    pub fn new(users: Arc<dyn UserStore>, roles: Arc<dyn RoleStore>) -> Self {
        Self {
            users,
            roles,
            audit: None,
            read_timeout: None,
        }
    }

    pub fn with_audit(mut self, audit: AuditService) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Bound the read phase of every operation. Zero disables the bound.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = if timeout.is_zero() { None } else { Some(timeout) };
        self
    }

    pub async fn list_roles(&self, ctx: &ExecutionContext) -> Result<Vec<Role>, AccessError> {
        self.run(ctx, "list_roles", async {
            let roles = self.read(ctx, self.roles.list_all()).await?;
            info!(count = roles.len(), "Listed roles");
            Ok(roles)
        })
        .await
    }

    /// Create a role. The name is trimmed; names compare case-sensitively.
    pub async fn create_role(
        &self,
        command: CreateRoleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Role, AccessError> {
        self.run(ctx, "create_role", async {
            let name = command.name.trim();
            if name.is_empty() {
                return Err(AccessError::invalid_input("Role name must not be empty"));
            }

            if self.read(ctx, self.roles.exists(name)).await? {
                return Err(AccessError::already_exists(name));
            }

            let role = Role::new(name).created_by(ctx.principal_id.as_str());

            self.ensure_not_cancelled(ctx)?;
            let roles = Arc::clone(&self.roles);
            let pending = role.clone();
            match detach(async move { roles.create(&pending).await }).await {
                Ok(()) => {}
                // another creator won the race between our check and the insert
                Err(StoreError::Conflict { .. }) => return Err(AccessError::already_exists(name)),
                Err(e) => return Err(AccessError::failed(FailureKind::CreateFailed, &e)),
            }

            info!(role = %role.name, role_id = %role.id, "Role created");
            self.record(ctx, AuditAction::RoleCreated, "Role", &role.name, &command)
                .await;
            Ok(role)
        })
        .await
    }

    pub async fn list_users(&self, ctx: &ExecutionContext) -> Result<Vec<User>, AccessError> {
        self.run(ctx, "list_users", async {
            let users = self.read(ctx, self.users.list_all()).await?;
            info!(count = users.len(), "Listed users");
            Ok(users)
        })
        .await
    }

    pub async fn assign_role_to_user(
        &self,
        command: AssignRoleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Change, AccessError> {
        self.run(ctx, "assign_role_to_user", async {
            let user = self.require_user(&command.email, ctx).await?;
            let role_name = command.role_name.trim().to_string();
            self.require_role(&role_name, ctx).await?;

            let user_key = user.normalized_email.clone();
            let role = role_name.clone();
            let change = self
                .write_user(user, FailureKind::AssignmentFailed, ctx, move |users, user| async move {
                    users.add_role(&user, &role).await
                })
                .await?;

            match change {
                Change::Applied => {
                    info!(email = %user_key, role = %role_name, "Role assigned");
                    self.record(ctx, AuditAction::RoleAssigned, "User", &user_key, &command)
                        .await;
                }
                Change::Unchanged => {
                    info!(email = %user_key, role = %role_name, "Role already held")
                }
            }
            Ok(change)
        })
        .await
    }

    /// Attach a claim. Adding a pair the user already holds is a no-op.
    pub async fn add_claim_to_user(
        &self,
        command: AddClaimCommand,
        ctx: &ExecutionContext,
    ) -> Result<Change, AccessError> {
        self.run(ctx, "add_claim_to_user", async {
            if command.claim_type.is_empty() {
                return Err(AccessError::invalid_input("Claim type must not be empty"));
            }
            if command.claim_value.is_empty() {
                return Err(AccessError::invalid_input("Claim value must not be empty"));
            }

            let user = self.require_user(&command.email, ctx).await?;
            let user_key = user.normalized_email.clone();

            let claim = UserClaim::new(command.claim_type.as_str(), command.claim_value.as_str());
            let change = self
                .write_user(user, FailureKind::ClaimAssignmentFailed, ctx, move |users, user| async move {
                    users.add_claim(&user, &claim).await
                })
                .await?;

            match change {
                Change::Applied => {
                    info!(email = %user_key, claim_type = %command.claim_type, "Claim added");
                    self.record(ctx, AuditAction::ClaimAdded, "User", &user_key, &command)
                        .await;
                }
                Change::Unchanged => {
                    info!(email = %user_key, claim_type = %command.claim_type, "Claim already present")
                }
            }
            Ok(change)
        })
        .await
    }

    pub async fn get_user_roles(
        &self,
        email: &str,
        ctx: &ExecutionContext,
    ) -> Result<Vec<String>, AccessError> {
        self.run(ctx, "get_user_roles", async {
            let user = self.require_user(email, ctx).await?;
            let roles = self
                .guarded_read(ctx, self.users.get_roles(&user))
                .await?
                .map_err(|e| user_read_error(email, e))?;
            info!(email, count = roles.len(), "Fetched user roles");
            Ok(roles)
        })
        .await
    }

    pub async fn get_user_claims(
        &self,
        email: &str,
        ctx: &ExecutionContext,
    ) -> Result<Vec<UserClaim>, AccessError> {
        self.run(ctx, "get_user_claims", async {
            let user = self.require_user(email, ctx).await?;
            let claims = self
                .guarded_read(ctx, self.users.get_claims(&user))
                .await?
                .map_err(|e| user_read_error(email, e))?;
            info!(email, count = claims.len(), "Fetched user claims");
            Ok(claims)
        })
        .await
    }

    /// Revoke a role. The role must exist; the user need not hold it.
    /// Role names are trimmed the same way `create_role` trims them.
    pub async fn remove_user_from_role(
        &self,
        command: RemoveRoleCommand,
        ctx: &ExecutionContext,
    ) -> Result<Change, AccessError> {
        self.run(ctx, "remove_user_from_role", async {
            let user = self.require_user(&command.email, ctx).await?;
            let role_name = command.role_name.trim().to_string();
            self.require_role(&role_name, ctx).await?;

            let user_key = user.normalized_email.clone();
            let role = role_name.clone();
            let change = self
                .write_user(user, FailureKind::RevocationFailed, ctx, move |users, user| async move {
                    users.remove_role(&user, &role).await
                })
                .await?;

            match change {
                Change::Applied => {
                    info!(email = %user_key, role = %role_name, "Role revoked");
                    self.record(ctx, AuditAction::RoleUnassigned, "User", &user_key, &command)
                        .await;
                }
                Change::Unchanged => {
                    info!(email = %user_key, role = %role_name, "Role was not held")
                }
            }
            Ok(change)
        })
        .await
    }

    /// Run `operation` inside the context's span and log how it failed.
    async fn run<T, Fut>(
        &self,
        ctx: &ExecutionContext,
        operation: &'static str,
        body: Fut,
    ) -> Result<T, AccessError>
    where
        Fut: Future<Output = Result<T, AccessError>>,
    {
        async move {
            let result = body.await;
            if let Err(err) = &result {
                match err {
                    AccessError::OperationFailed { .. } => error!(error = %err, code = err.code(), "Operation failed"),
                    AccessError::Cancelled { .. } => warn!(error = %err, "Operation cancelled"),
                    _ => info!(error = %err, code = err.code(), "Operation rejected"),
                }
            }
            result
        }
        .instrument(ctx.span(operation))
        .await
    }

    async fn require_user(&self, email: &str, ctx: &ExecutionContext) -> Result<User, AccessError> {
        self.read(ctx, self.users.find_by_email(email))
            .await?
            .ok_or_else(|| AccessError::user_not_found(email))
    }

    async fn require_role(&self, name: &str, ctx: &ExecutionContext) -> Result<(), AccessError> {
        if self.read(ctx, self.roles.exists(name)).await? {
            Ok(())
        } else {
            Err(AccessError::role_not_found(name))
        }
    }

    /// Read with any store failure reported as `ReadFailed`.
    async fn read<T, Fut>(&self, ctx: &ExecutionContext, read: Fut) -> Result<T, AccessError>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        self.guarded_read(ctx, read)
            .await?
            .map_err(AccessError::read_failed)
    }

    /// Race a read against cancellation and the optional read timeout.
    async fn guarded_read<T, Fut>(
        &self,
        ctx: &ExecutionContext,
        read: Fut,
    ) -> Result<StoreResult<T>, AccessError>
    where
        Fut: Future<Output = StoreResult<T>>,
    {
        let token = ctx.cancellation_token();
        match self.read_timeout {
            Some(limit) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(AccessError::cancelled("cancelled by caller")),
                outcome = tokio::time::timeout(limit, read) => outcome.map_err(|_| {
                    AccessError::cancelled(format!("read phase exceeded {}ms", limit.as_millis()))
                }),
            },
            None => tokio::select! {
                biased;
                _ = token.cancelled() => Err(AccessError::cancelled("cancelled by caller")),
                outcome = read => Ok(outcome),
            },
        }
    }

    fn ensure_not_cancelled(&self, ctx: &ExecutionContext) -> Result<(), AccessError> {
        if ctx.is_cancelled() {
            return Err(AccessError::cancelled("cancelled before write"));
        }
        Ok(())
    }

    /// Dispatch a write against `user` and translate the store outcome.
    async fn write_user<F, Fut>(
        &self,
        user: User,
        failure: FailureKind,
        ctx: &ExecutionContext,
        write: F,
    ) -> Result<Change, AccessError>
    where
        F: FnOnce(Arc<dyn UserStore>, User) -> Fut,
        Fut: Future<Output = StoreResult<bool>> + Send + 'static,
    {
        self.ensure_not_cancelled(ctx)?;

        let email = user.email.clone();
        match detach(write(Arc::clone(&self.users), user)).await {
            Ok(changed) => Ok(Change::from(changed)),
            // removed between our lookup and the write
            Err(StoreError::NotFound { .. }) => Err(AccessError::user_not_found(email)),
            Err(e) => Err(AccessError::failed(failure, &e)),
        }
    }

    async fn record<C: Serialize>(
        &self,
        ctx: &ExecutionContext,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        command: &C,
    ) {
        if let Some(audit) = &self.audit {
            audit.record(ctx, action, entity_type, entity_id, command).await;
        }
    }
}

/// Run a store write on its own task so it outlives a dropped caller.
async fn detach<T, Fut>(write: Fut) -> StoreResult<T>
where
    T: Send + 'static,
    Fut: Future<Output = StoreResult<T>> + Send + 'static,
{
    match tokio::spawn(write.in_current_span()).await {
        Ok(outcome) => outcome,
        Err(join_error) => Err(StoreError::Backend(format!(
            "store write task failed: {}",
            join_error
        ))),
    }
}

fn user_read_error(email: &str, err: StoreError) -> AccessError {
    match err {
        StoreError::NotFound { .. } => AccessError::user_not_found(email),
        other => AccessError::read_failed(other),
    }
}

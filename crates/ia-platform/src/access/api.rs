//! Access Setup API
//!
//! REST endpoints for role, membership and claim administration, mounted
//! under `/api/setup`.

use axum::{
    extract::{Query, State},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use super::commands::{AddClaimCommand, AssignRoleCommand, CreateRoleCommand, RemoveRoleCommand};
use super::service::{AccessAdminService, Change};
use crate::role::Role;
use crate::shared::api_common::{ErrorResponse, ResultResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::RequestContext;
use crate::user::{User, UserClaim};

pub const ACCESS_BASE_PATH: &str = "/api/setup";

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            created_at: r.created_at.to_rfc3339(),
            created_by: r.created_by,
        }
    }
}

/// User as exposed over HTTP; credentials are never included
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub user_name: String,
    pub email_confirmed: bool,
    pub roles: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            user_name: u.user_name,
            email_confirmed: u.email_confirmed,
            roles: u.roles.into_iter().collect(),
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClaimResponse {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl From<UserClaim> for ClaimResponse {
    fn from(c: UserClaim) -> Self {
        Self {
            claim_type: c.claim_type,
            value: c.value,
        }
    }
}

// Query parameters default to empty so that missing values reach the
// service and come back as INVALID_INPUT / not-found errors in JSON.

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CreateRoleQuery {
    /// Name of the role to create
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmailQuery {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct RoleMembershipQuery {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ClaimQuery {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub claim_name: String,
    #[serde(default)]
    pub claim_value: String,
}

#[derive(Clone)]
pub struct AccessState {
    pub service: AccessAdminService,
}

/// List all roles
#[utoipa::path(
    get,
    path = "",
    tag = "setup",
    operation_id = "getApiSetupRoles",
    responses(
        (status = 200, description = "All roles", body = Vec<RoleResponse>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_roles(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Vec<RoleResponse>>, PlatformError> {
    let roles = state.service.list_roles(&ctx).await?;
    Ok(Json(roles.into_iter().map(RoleResponse::from).collect()))
}

/// Create a role
#[utoipa::path(
    post,
    path = "",
    tag = "setup",
    operation_id = "postApiSetupRoles",
    params(CreateRoleQuery),
    responses(
        (status = 200, description = "Role created", body = ResultResponse),
        (status = 400, description = "Empty role name", body = ErrorResponse),
        (status = 409, description = "Role already exists", body = ErrorResponse)
    )
)]
pub async fn create_role(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<CreateRoleQuery>,
) -> Result<Json<ResultResponse>, PlatformError> {
    let role = state
        .service
        .create_role(CreateRoleCommand::new(query.name), &ctx)
        .await?;
    Ok(Json(ResultResponse::new(format!(
        "The Role {} has been added successfully",
        role.name
    ))))
}

/// List all users
#[utoipa::path(
    get,
    path = "/getallusers",
    tag = "setup",
    operation_id = "getApiSetupUsers",
    responses(
        (status = 200, description = "All users", body = Vec<UserResponse>),
        (status = 500, description = "Store unavailable", body = ErrorResponse)
    )
)]
pub async fn list_users(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
) -> Result<Json<Vec<UserResponse>>, PlatformError> {
    let users = state.service.list_users(&ctx).await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Add a user to a role
#[utoipa::path(
    post,
    path = "/addusertorole",
    tag = "setup",
    operation_id = "postApiSetupAddUserToRole",
    params(RoleMembershipQuery),
    responses(
        (status = 200, description = "User is a member of the role", body = ResultResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    )
)]
pub async fn add_user_to_role(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<RoleMembershipQuery>,
) -> Result<Json<ResultResponse>, PlatformError> {
    let change = state
        .service
        .assign_role_to_user(AssignRoleCommand::new(&query.email, &query.role_name), &ctx)
        .await?;

    let message = match change {
        Change::Applied => format!(
            "Success, user {} has been added to the role {}",
            query.email, query.role_name
        ),
        Change::Unchanged => format!(
            "User {} already has the role {}",
            query.email, query.role_name
        ),
    };
    Ok(Json(ResultResponse::new(message)))
}

/// Attach a claim to a user
#[utoipa::path(
    post,
    path = "/addclaimstouser",
    tag = "setup",
    operation_id = "postApiSetupAddClaimsToUser",
    params(ClaimQuery),
    responses(
        (status = 200, description = "User holds the claim", body = ResultResponse),
        (status = 400, description = "Empty claim name or value", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn add_claims_to_user(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<ClaimQuery>,
) -> Result<Json<ResultResponse>, PlatformError> {
    let change = state
        .service
        .add_claim_to_user(
            AddClaimCommand::new(&query.email, &query.claim_name, &query.claim_value),
            &ctx,
        )
        .await?;

    let message = match change {
        Change::Applied => format!(
            "User {} has a claim {} added to them",
            query.email, query.claim_name
        ),
        Change::Unchanged => format!(
            "User {} already has the claim {}",
            query.email, query.claim_name
        ),
    };
    Ok(Json(ResultResponse::new(message)))
}

/// Role names held by a user
#[utoipa::path(
    get,
    path = "/getuserroles",
    tag = "setup",
    operation_id = "getApiSetupUserRoles",
    params(EmailQuery),
    responses(
        (status = 200, description = "Role names", body = Vec<String>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_user_roles(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<String>>, PlatformError> {
    Ok(Json(state.service.get_user_roles(&query.email, &ctx).await?))
}

/// Claims attached to a user
#[utoipa::path(
    get,
    path = "/getalluserclaims",
    tag = "setup",
    operation_id = "getApiSetupUserClaims",
    params(EmailQuery),
    responses(
        (status = 200, description = "Claims", body = Vec<ClaimResponse>),
        (status = 404, description = "User not found", body = ErrorResponse)
    )
)]
pub async fn get_all_user_claims(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<ClaimResponse>>, PlatformError> {
    let claims = state.service.get_user_claims(&query.email, &ctx).await?;
    Ok(Json(claims.into_iter().map(ClaimResponse::from).collect()))
}

/// Remove a user from a role
#[utoipa::path(
    post,
    path = "/removeuserfromrole",
    tag = "setup",
    operation_id = "postApiSetupRemoveUserFromRole",
    params(RoleMembershipQuery),
    responses(
        (status = 200, description = "User is not a member of the role", body = ResultResponse),
        (status = 404, description = "User or role not found", body = ErrorResponse)
    )
)]
pub async fn remove_user_from_role(
    State(state): State<AccessState>,
    RequestContext(ctx): RequestContext,
    Query(query): Query<RoleMembershipQuery>,
) -> Result<Json<ResultResponse>, PlatformError> {
    let change = state
        .service
        .remove_user_from_role(RemoveRoleCommand::new(&query.email, &query.role_name), &ctx)
        .await?;

    let message = match change {
        Change::Applied => format!(
            "User {} has been removed from role {}",
            query.email, query.role_name
        ),
        Change::Unchanged => format!(
            "User {} did not have the role {}",
            query.email, query.role_name
        ),
    };
    Ok(Json(ResultResponse::new(message)))
}

pub fn access_router(state: AccessState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_roles, create_role))
        .routes(routes!(list_users))
        .routes(routes!(add_user_to_role))
        .routes(routes!(add_claims_to_user))
        .routes(routes!(get_user_roles))
        .routes(routes!(get_all_user_claims))
        .routes(routes!(remove_user_from_role))
        .with_state(state)
}

/// Router with the setup API mounted at [`ACCESS_BASE_PATH`], plus its
/// OpenAPI document.
pub fn build_app(state: AccessState) -> (Router, utoipa::openapi::OpenApi) {
    OpenApiRouter::new()
        .nest(ACCESS_BASE_PATH, access_router(state))
        .split_for_parts()
}

//! Roles Admin API
//!
//! REST endpoints for role management.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::module_permission::repository::ModulePermissionRepository;
use crate::role::detail::{RoleDetailLoader, RoleDetailResponse, LinkOrdering, shape_role_detail, shape_role_details};
use crate::role::entity::{Role, RoleStatus};
use crate::role::linker::ModulePermissionGrant;
use crate::role::operations::{
    CreateRoleCommand, CreateRoleUseCase,
    UpdateRoleCommand, UpdateRoleUseCase,
    DeleteRoleCommand, DeleteRoleUseCase,
};
use crate::role::repository::RoleRepository;
use crate::shared::api_common::{PaginationParams, PaginatedResponse, SuccessResponse};
use crate::shared::error::AuthError;
use crate::shared::platform::Platform;
use crate::special_role::repository::SpecialRoleRepository;
use crate::usecase::MongoUnitOfWork;

/// Create role request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoleRequest {
    pub name: String,

    pub platform: Platform,

    /// Defaults to inactive when omitted
    pub status: Option<RoleStatus>,

    /// Requested grants; each is validated against the permission
    /// registry before anything is written
    #[serde(default)]
    pub module_permissions: Vec<ModulePermissionGrant>,
}

/// Update role request. The grant list fully replaces the prior one.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    pub name: String,

    pub platform: Platform,

    pub status: Option<RoleStatus>,

    #[serde(default)]
    pub module_permissions: Vec<ModulePermissionGrant>,
}

/// Slim role response for write acknowledgements and bulk lookups
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub status: RoleStatus,
}

impl From<Role> for RoleResponse {
    fn from(r: Role) -> Self {
        Self {
            id: r.id,
            name: r.name,
            platform: r.platform,
            status: r.status,
        }
    }
}

/// Query parameters for the role listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RolesQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Case-insensitive name substring
    pub search: Option<String>,

    /// Defaults to both active and inactive when omitted
    pub status: Option<RoleStatus>,

    /// Defaults to all platforms when omitted
    pub platform: Option<Platform>,
}

/// Roles service state
#[derive(Clone)]
pub struct RolesState {
    pub roles: Arc<RoleRepository>,
    pub modules: Arc<ModulePermissionRepository>,
    pub special_roles: Arc<SpecialRoleRepository>,
    pub loader: RoleDetailLoader,
    pub unit_of_work: Arc<MongoUnitOfWork>,
}

/// Create a new role
#[utoipa::path(
    post,
    path = "",
    tag = "roles",
    operation_id = "postAuthRoles",
    request_body = CreateRoleRequest,
    responses(
        (status = 200, description = "Role created", body = RoleResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate role name for platform")
    )
)]
pub async fn create_role(
    State(state): State<RolesState>,
    Json(req): Json<CreateRoleRequest>,
) -> Result<Json<RoleResponse>, AuthError> {
    let use_case = CreateRoleUseCase::new(
        state.roles.clone(),
        state.modules.clone(),
        state.unit_of_work.clone(),
    );

    let role = use_case
        .execute(CreateRoleCommand {
            name: req.name,
            platform: req.platform,
            status: req.status,
            module_permissions: req.module_permissions,
        })
        .await?;

    Ok(Json(role.into()))
}

/// Get a role with its nested permission tree
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "roles",
    operation_id = "getAuthRolesById",
    params(
        ("id" = String, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role found", body = RoleDetailResponse),
        (status = 404, description = "Role not found")
    )
)]
pub async fn get_role(
    State(state): State<RolesState>,
    Path(id): Path<String>,
) -> Result<Json<RoleDetailResponse>, AuthError> {
    let role = state
        .roles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("Role", &id))?;

    let loaded = state
        .loader
        .load(vec![role], LinkOrdering::ByGroupSequence)
        .await?;

    // load() preserves its input, so the single role is always present
    let detail = loaded
        .first()
        .map(shape_role_detail)
        .ok_or_else(|| AuthError::not_found("Role", &id))?;

    Ok(Json(detail))
}

/// List roles with their nested permission trees
#[utoipa::path(
    get,
    path = "",
    tag = "roles",
    operation_id = "getAuthRoles",
    params(RolesQuery),
    responses(
        (status = 200, description = "Paginated list of roles", body = PaginatedResponse<RoleDetailResponse>)
    )
)]
pub async fn list_roles(
    State(state): State<RolesState>,
    Query(query): Query<RolesQuery>,
) -> Result<Json<PaginatedResponse<RoleDetailResponse>>, AuthError> {
    let search = query.search.as_deref();

    // Two-phase listing: page the bare roles first, then eagerly load
    // relations for just that page
    let roles = state
        .roles
        .search(
            search,
            query.status,
            query.platform,
            query.pagination.skip(),
            query.pagination.limit(),
        )
        .await?;
    let total = state.roles.count(search, query.status, query.platform).await?;

    let loaded = state
        .loader
        .load(roles, LinkOrdering::ByModuleSequence)
        .await?;
    let items = shape_role_details(&loaded);

    Ok(Json(PaginatedResponse::new(
        items,
        query.pagination.page(),
        query.pagination.limit(),
        total,
    )))
}

/// Fetch roles in bulk by their IDs
#[utoipa::path(
    post,
    path = "/batches",
    tag = "roles",
    operation_id = "postAuthRolesBatches",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Matching roles", body = Vec<RoleResponse>)
    )
)]
pub async fn get_roles_bulk(
    State(state): State<RolesState>,
    Json(role_ids): Json<Vec<String>>,
) -> Result<Json<Vec<RoleResponse>>, AuthError> {
    let roles = state.roles.find_by_ids(&role_ids).await?;
    Ok(Json(roles.into_iter().map(Into::into).collect()))
}

/// Update a role, replacing its entire grant set
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "roles",
    operation_id = "putAuthRolesById",
    params(
        ("id" = String, Path, description = "Role ID")
    ),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = RoleResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Role not found")
    )
)]
pub async fn update_role(
    State(state): State<RolesState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<Json<RoleResponse>, AuthError> {
    let use_case = UpdateRoleUseCase::new(
        state.roles.clone(),
        state.modules.clone(),
        state.unit_of_work.clone(),
    );

    let role = use_case
        .execute(UpdateRoleCommand {
            role_id: id,
            name: req.name,
            platform: req.platform,
            status: req.status,
            module_permissions: req.module_permissions,
        })
        .await?;

    Ok(Json(role.into()))
}

/// Soft-delete a role
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "roles",
    operation_id = "deleteAuthRolesById",
    params(
        ("id" = String, Path, description = "Role ID")
    ),
    responses(
        (status = 200, description = "Role deleted", body = SuccessResponse),
        (status = 404, description = "Role not found"),
        (status = 409, description = "Role is referenced by a special role")
    )
)]
pub async fn delete_role(
    State(state): State<RolesState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let use_case = DeleteRoleUseCase::new(
        state.roles.clone(),
        state.special_roles.clone(),
        state.unit_of_work.clone(),
    );

    use_case.execute(DeleteRoleCommand { role_id: id }).await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create roles router
pub fn roles_router(state: RolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_role, list_roles))
        .routes(routes!(get_roles_bulk))
        .routes(routes!(get_role, update_role, delete_role))
        .with_state(state)
}

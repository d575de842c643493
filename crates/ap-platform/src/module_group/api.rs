//! Module Groups Admin API
//!
//! REST endpoints for display-group administration. Listings nest each
//! group's live permission modules, ordered by sequence.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::module_group::entity::ModuleGroup;
use crate::module_group::repository::ModuleGroupRepository;
use crate::module_permission::entity::ModulePermission;
use crate::module_permission::repository::ModulePermissionRepository;
use crate::shared::api_common::{PaginationParams, PaginatedResponse, SuccessResponse};
use crate::shared::error::AuthError;
use crate::shared::platform::Platform;

/// Create module group request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateModuleGroupRequest {
    pub name: String,

    pub platform: Platform,

    #[serde(default)]
    pub sequence: i32,
}

/// Update module group request; absent fields are left untouched
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateModuleGroupRequest {
    pub name: Option<String>,
    pub sequence: Option<i32>,
}

/// Module nested under a group response
#[derive(Debug, Serialize, ToSchema)]
pub struct GroupModuleResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub platform: Platform,
    pub sequence: i32,
    pub permissions: Vec<String>,
}

impl From<&ModulePermission> for GroupModuleResponse {
    fn from(m: &ModulePermission) -> Self {
        Self {
            id: m.id.clone(),
            code: m.code.clone(),
            name: m.name.clone(),
            platform: m.platform,
            sequence: m.sequence,
            permissions: m.permissions.clone(),
        }
    }
}

/// Group with its nested modules
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleGroupDetailResponse {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub sequence: i32,
    pub modules: Vec<GroupModuleResponse>,
}

impl ModuleGroupDetailResponse {
    fn new(group: ModuleGroup, modules: Vec<GroupModuleResponse>) -> Self {
        Self {
            id: group.id,
            name: group.name,
            platform: group.platform,
            sequence: group.sequence,
            modules,
        }
    }
}

/// Query parameters for the group listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModuleGroupsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Case-insensitive name substring
    pub search: Option<String>,

    /// Defaults to all platforms (including NONE) when omitted
    pub platform: Option<Platform>,
}

/// Module groups service state
#[derive(Clone)]
pub struct ModuleGroupsState {
    pub groups: Arc<ModuleGroupRepository>,
    pub modules: Arc<ModulePermissionRepository>,
}

/// Create a new module group
#[utoipa::path(
    post,
    path = "",
    tag = "module-groups",
    operation_id = "postAuthRoleGroups",
    request_body = CreateModuleGroupRequest,
    responses(
        (status = 200, description = "Group created", body = ModuleGroupDetailResponse)
    )
)]
pub async fn create_module_group(
    State(state): State<ModuleGroupsState>,
    Json(req): Json<CreateModuleGroupRequest>,
) -> Result<Json<ModuleGroupDetailResponse>, AuthError> {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AuthError::validation("Group name is required"));
    }

    let group = ModuleGroup::new(name, req.platform, req.sequence);
    state.groups.insert(&group).await?;

    Ok(Json(ModuleGroupDetailResponse::new(group, Vec::new())))
}

/// Get a module group with its nested modules
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "module-groups",
    operation_id = "getAuthRoleGroupsById",
    params(
        ("id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group found", body = ModuleGroupDetailResponse),
        (status = 404, description = "Group not found")
    )
)]
pub async fn get_module_group(
    State(state): State<ModuleGroupsState>,
    Path(id): Path<String>,
) -> Result<Json<ModuleGroupDetailResponse>, AuthError> {
    let group = state
        .groups
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("ModuleGroup", &id))?;

    let modules = state
        .modules
        .find_by_group_ids(std::slice::from_ref(&group.id))
        .await?;
    let nested = modules.iter().map(Into::into).collect();

    Ok(Json(ModuleGroupDetailResponse::new(group, nested)))
}

/// List module groups with nested modules
#[utoipa::path(
    get,
    path = "",
    tag = "module-groups",
    operation_id = "getAuthRoleGroups",
    params(ModuleGroupsQuery),
    responses(
        (status = 200, description = "Paginated list of groups", body = PaginatedResponse<ModuleGroupDetailResponse>)
    )
)]
pub async fn list_module_groups(
    State(state): State<ModuleGroupsState>,
    Query(query): Query<ModuleGroupsQuery>,
) -> Result<Json<PaginatedResponse<ModuleGroupDetailResponse>>, AuthError> {
    let search = query.search.as_deref();

    // Page the groups (ordered by group.sequence), then nest each one's
    // modules (already ordered by module.sequence from the repository)
    let groups = state
        .groups
        .search(
            search,
            query.platform,
            query.pagination.skip(),
            query.pagination.limit(),
        )
        .await?;
    let total = state.groups.count(search, query.platform).await?;

    let group_ids: Vec<String> = groups.iter().map(|g| g.id.clone()).collect();
    let modules = state.modules.find_by_group_ids(&group_ids).await?;

    let items = groups
        .into_iter()
        .map(|group| {
            let nested = modules
                .iter()
                .filter(|m| m.group_id.as_deref() == Some(group.id.as_str()))
                .map(Into::into)
                .collect();
            ModuleGroupDetailResponse::new(group, nested)
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        items,
        query.pagination.page(),
        query.pagination.limit(),
        total,
    )))
}

/// Update a module group
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "module-groups",
    operation_id = "putAuthRoleGroupsById",
    params(
        ("id" = String, Path, description = "Group ID")
    ),
    request_body = UpdateModuleGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = ModuleGroupDetailResponse),
        (status = 404, description = "Group not found")
    )
)]
pub async fn update_module_group(
    State(state): State<ModuleGroupsState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateModuleGroupRequest>,
) -> Result<Json<ModuleGroupDetailResponse>, AuthError> {
    let mut group = state
        .groups
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("ModuleGroup", &id))?;

    if let Some(name) = req.name {
        group.name = name;
    }
    if let Some(sequence) = req.sequence {
        group.sequence = sequence;
    }
    group.updated_at = chrono::Utc::now();

    state.groups.update(&group).await?;

    let modules = state
        .modules
        .find_by_group_ids(std::slice::from_ref(&group.id))
        .await?;
    let nested = modules.iter().map(Into::into).collect();

    Ok(Json(ModuleGroupDetailResponse::new(group, nested)))
}

/// Soft-delete a module group
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "module-groups",
    operation_id = "deleteAuthRoleGroupsById",
    params(
        ("id" = String, Path, description = "Group ID")
    ),
    responses(
        (status = 200, description = "Group deleted", body = SuccessResponse),
        (status = 404, description = "Group not found")
    )
)]
pub async fn delete_module_group(
    State(state): State<ModuleGroupsState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let deleted = state.groups.soft_delete(&id).await?;
    if !deleted {
        return Err(AuthError::not_found("ModuleGroup", &id));
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Create module groups router
pub fn module_groups_router(state: ModuleGroupsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_module_group, list_module_groups))
        .routes(routes!(
            get_module_group,
            update_module_group,
            delete_module_group
        ))
        .with_state(state)
}

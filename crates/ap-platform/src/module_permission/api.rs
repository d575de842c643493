//! Permission Modules Admin API
//!
//! REST endpoints for the permission registry.

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

/// Create permission module request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateModulePermissionRequest {
    pub code: String,

    pub name: String,

    /// Owning display group
    pub group_id: String,

    pub platform: Platform,

    #[serde(default)]
    pub sequence: i32,

    /// Registered permission superset
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Update permission module request; absent fields are left untouched
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateModulePermissionRequest {
    pub name: Option<String>,
    pub group_id: Option<String>,
    pub sequence: Option<i32>,
    pub permissions: Option<Vec<String>>,
}

/// Owning group summary attached to module responses
#[derive(Debug, Serialize, ToSchema)]
pub struct ModuleGroupInfo {
    pub id: String,
    pub name: String,
    pub platform: Platform,
    pub sequence: i32,
}

impl From<&ModuleGroup> for ModuleGroupInfo {
    fn from(g: &ModuleGroup) -> Self {
        Self {
            id: g.id.clone(),
            name: g.name.clone(),
            platform: g.platform,
            sequence: g.sequence,
        }
    }
}

/// Permission module response
#[derive(Debug, Serialize, ToSchema)]
pub struct ModulePermissionResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub platform: Platform,
    pub sequence: i32,
    pub permissions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<ModuleGroupInfo>,
}

impl ModulePermissionResponse {
    fn new(module: ModulePermission, group: Option<&ModuleGroup>) -> Self {
        Self {
            id: module.id,
            code: module.code,
            name: module.name,
            platform: module.platform,
            sequence: module.sequence,
            permissions: module.permissions,
            group: group.map(Into::into),
        }
    }
}

/// Query parameters for the module listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ModulePermissionsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Case-insensitive name substring
    pub search: Option<String>,

    /// Defaults to all platforms when omitted
    pub platform: Option<Platform>,
}

/// Permission modules service state
#[derive(Clone)]
pub struct ModulePermissionsState {
    pub modules: Arc<ModulePermissionRepository>,
    pub groups: Arc<ModuleGroupRepository>,
}

/// Register a new permission module
#[utoipa::path(
    post,
    path = "",
    tag = "permission-modules",
    operation_id = "postAuthRoleModules",
    request_body = CreateModulePermissionRequest,
    responses(
        (status = 200, description = "Module registered", body = ModulePermissionResponse),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Duplicate code for platform")
    )
)]
pub async fn create_module_permission(
    State(state): State<ModulePermissionsState>,
    Json(req): Json<CreateModulePermissionRequest>,
) -> Result<Json<ModulePermissionResponse>, AuthError> {
    if let Some(existing) = state
        .modules
        .find_by_code_and_platform(&req.code, req.platform)
        .await?
    {
        return Err(AuthError::duplicate(
            "ModulePermission",
            "code",
            format!("{} ({})", existing.code, existing.platform),
        ));
    }

    let group = state
        .groups
        .find_by_id(&req.group_id)
        .await?
        .ok_or_else(|| AuthError::not_found("ModuleGroup", &req.group_id))?;

    let module = ModulePermission::new(req.code, req.name, req.platform)
        .with_group(&group.id)
        .with_sequence(req.sequence)
        .with_permissions(req.permissions);

    state.modules.insert(&module).await?;

    Ok(Json(ModulePermissionResponse::new(module, Some(&group))))
}

/// Get a permission module with its owning group
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "permission-modules",
    operation_id = "getAuthRoleModulesById",
    params(
        ("id" = String, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Module found", body = ModulePermissionResponse),
        (status = 404, description = "Module not found")
    )
)]
pub async fn get_module_permission(
    State(state): State<ModulePermissionsState>,
    Path(id): Path<String>,
) -> Result<Json<ModulePermissionResponse>, AuthError> {
    let module = state
        .modules
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("ModulePermission", &id))?;

    let group = match &module.group_id {
        Some(group_id) => state.groups.find_by_id(group_id).await?,
        None => None,
    };

    Ok(Json(ModulePermissionResponse::new(module, group.as_ref())))
}

/// List permission modules
#[utoipa::path(
    get,
    path = "",
    tag = "permission-modules",
    operation_id = "getAuthRoleModules",
    params(ModulePermissionsQuery),
    responses(
        (status = 200, description = "Paginated list of modules", body = PaginatedResponse<ModulePermissionResponse>)
    )
)]
pub async fn list_module_permissions(
    State(state): State<ModulePermissionsState>,
    Query(query): Query<ModulePermissionsQuery>,
) -> Result<Json<PaginatedResponse<ModulePermissionResponse>>, AuthError> {
    let search = query.search.as_deref();

    let modules = state
        .modules
        .search(
            search,
            query.platform,
            query.pagination.skip(),
            query.pagination.limit(),
        )
        .await?;
    let total = state.modules.count(search, query.platform).await?;

    let mut group_ids: Vec<String> = modules.iter().filter_map(|m| m.group_id.clone()).collect();
    group_ids.sort();
    group_ids.dedup();
    let groups = state.groups.find_by_ids(&group_ids).await?;

    let items = modules
        .into_iter()
        .map(|module| {
            let group = module
                .group_id
                .as_ref()
                .and_then(|gid| groups.iter().find(|g| &g.id == gid));
            let group = group.cloned();
            ModulePermissionResponse::new(module, group.as_ref())
        })
        .collect();

    Ok(Json(PaginatedResponse::new(
        items,
        query.pagination.page(),
        query.pagination.limit(),
        total,
    )))
}

/// Update a permission module
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "permission-modules",
    operation_id = "putAuthRoleModulesById",
    params(
        ("id" = String, Path, description = "Module ID")
    ),
    request_body = UpdateModulePermissionRequest,
    responses(
        (status = 200, description = "Module updated", body = ModulePermissionResponse),
        (status = 404, description = "Module or group not found")
    )
)]
pub async fn update_module_permission(
    State(state): State<ModulePermissionsState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateModulePermissionRequest>,
) -> Result<Json<ModulePermissionResponse>, AuthError> {
    let mut module = state
        .modules
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("ModulePermission", &id))?;

    if let Some(group_id) = &req.group_id {
        state
            .groups
            .find_by_id(group_id)
            .await?
            .ok_or_else(|| AuthError::not_found("ModuleGroup", group_id))?;
        module.group_id = Some(group_id.clone());
    }
    if let Some(name) = req.name {
        module.name = name;
    }
    if let Some(sequence) = req.sequence {
        module.sequence = sequence;
    }
    if let Some(permissions) = req.permissions {
        module.permissions = permissions;
    }
    module.updated_at = chrono::Utc::now();

    state.modules.update(&module).await?;

    let group = match &module.group_id {
        Some(group_id) => state.groups.find_by_id(group_id).await?,
        None => None,
    };

    Ok(Json(ModulePermissionResponse::new(module, group.as_ref())))
}

/// Soft-delete a permission module
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "permission-modules",
    operation_id = "deleteAuthRoleModulesById",
    params(
        ("id" = String, Path, description = "Module ID")
    ),
    responses(
        (status = 200, description = "Module deleted", body = SuccessResponse),
        (status = 404, description = "Module not found")
    )
)]
pub async fn delete_module_permission(
    State(state): State<ModulePermissionsState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AuthError> {
    let deleted = state.modules.soft_delete(&id).await?;
    if !deleted {
        return Err(AuthError::not_found("ModulePermission", &id));
    }

    Ok(Json(SuccessResponse::ok()))
}

/// Create permission modules router
pub fn module_permissions_router(state: ModulePermissionsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_module_permission, list_module_permissions))
        .routes(routes!(
            get_module_permission,
            update_module_permission,
            delete_module_permission
        ))
        .with_state(state)
}

//! Special Roles API
//!
//! Admin endpoints for listing and binding special roles, plus the
//! internal lookup surface used by sibling services.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{ToSchema, IntoParams};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::details;
use crate::role::api::RoleResponse;
use crate::role::repository::RoleRepository;
use crate::shared::error::AuthError;
use crate::shared::platform::Platform;
use crate::special_role::entity::SpecialRole;
use crate::special_role::repository::SpecialRoleRepository;
use crate::usecase::UseCaseError;

/// Bind request: point a special role at a role
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateSpecialRoleRequest {
    pub role_id: String,
}

/// Special role with its bound role resolved
#[derive(Debug, Serialize, ToSchema)]
pub struct SpecialRoleDetailResponse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub platform: Platform,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<RoleResponse>,
}

impl SpecialRoleDetailResponse {
    fn new(special: SpecialRole, role: Option<RoleResponse>) -> Self {
        Self {
            id: special.id,
            code: special.code,
            name: special.name,
            platform: special.platform,
            role,
        }
    }
}

/// Query parameters for the special role listing
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SpecialRolesQuery {
    /// Case-insensitive name substring
    pub search: Option<String>,
}

/// Special roles service state
#[derive(Clone)]
pub struct SpecialRolesState {
    pub special_roles: Arc<SpecialRoleRepository>,
    pub roles: Arc<RoleRepository>,
}

impl SpecialRolesState {
    /// Resolve bound roles for a batch of special roles.
    async fn with_roles(
        &self,
        specials: Vec<SpecialRole>,
    ) -> Result<Vec<SpecialRoleDetailResponse>, AuthError> {
        let mut role_ids: Vec<String> = specials.iter().filter_map(|s| s.role_id.clone()).collect();
        role_ids.sort();
        role_ids.dedup();
        let roles = self.roles.find_by_ids(&role_ids).await?;

        Ok(specials
            .into_iter()
            .map(|special| {
                let role = special
                    .role_id
                    .as_ref()
                    .and_then(|rid| roles.iter().find(|r| &r.id == rid))
                    .cloned()
                    .map(Into::into);
                SpecialRoleDetailResponse::new(special, role)
            })
            .collect())
    }
}

/// List special roles
#[utoipa::path(
    get,
    path = "",
    tag = "special-roles",
    operation_id = "getAuthSpecialRoles",
    params(SpecialRolesQuery),
    responses(
        (status = 200, description = "Special roles", body = Vec<SpecialRoleDetailResponse>)
    )
)]
pub async fn list_special_roles(
    State(state): State<SpecialRolesState>,
    Query(query): Query<SpecialRolesQuery>,
) -> Result<Json<Vec<SpecialRoleDetailResponse>>, AuthError> {
    let specials = state.special_roles.find_all(query.search.as_deref()).await?;
    Ok(Json(state.with_roles(specials).await?))
}

/// Get a special role
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "special-roles",
    operation_id = "getAuthSpecialRolesById",
    params(
        ("id" = String, Path, description = "Special role ID")
    ),
    responses(
        (status = 200, description = "Special role found", body = SpecialRoleDetailResponse),
        (status = 404, description = "Special role not found")
    )
)]
pub async fn get_special_role(
    State(state): State<SpecialRolesState>,
    Path(id): Path<String>,
) -> Result<Json<SpecialRoleDetailResponse>, AuthError> {
    let special = state
        .special_roles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("SpecialRole", &id))?;

    let mut details = state.with_roles(vec![special]).await?;
    Ok(Json(details.remove(0)))
}

/// Bind a special role to a role
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "special-roles",
    operation_id = "putAuthSpecialRolesById",
    params(
        ("id" = String, Path, description = "Special role ID")
    ),
    request_body = UpdateSpecialRoleRequest,
    responses(
        (status = 200, description = "Special role bound", body = SpecialRoleDetailResponse),
        (status = 400, description = "Role does not exist"),
        (status = 404, description = "Special role not found")
    )
)]
pub async fn update_special_role(
    State(state): State<SpecialRolesState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSpecialRoleRequest>,
) -> Result<Json<SpecialRoleDetailResponse>, AuthError> {
    let mut special = state
        .special_roles
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AuthError::not_found("SpecialRole", &id))?;

    // The bound role must exist and be live
    let role = state
        .roles
        .find_by_id(&req.role_id)
        .await?
        .ok_or_else(|| {
            AuthError::from(UseCaseError::validation_with_details(
                "ROLE_ID_NOT_FOUND",
                format!("Role with ID '{}' not found", req.role_id),
                details! { "property" => "role_id", "value" => req.role_id },
            ))
        })?;

    special.bind_role(&role.id);
    state.special_roles.update(&special).await?;

    Ok(Json(SpecialRoleDetailResponse::new(
        special,
        Some(role.into()),
    )))
}

/// Internal: look up a special role by code
#[utoipa::path(
    post,
    path = "/special-roles/get-by-code/{code}",
    tag = "internal",
    operation_id = "postInternalSpecialRolesByCode",
    params(
        ("code" = String, Path, description = "Special role code")
    ),
    responses(
        (status = 200, description = "Special role found", body = SpecialRoleDetailResponse),
        (status = 404, description = "Special role not found")
    )
)]
pub async fn get_special_role_by_code(
    State(state): State<SpecialRolesState>,
    Path(code): Path<String>,
) -> Result<Json<SpecialRoleDetailResponse>, AuthError> {
    let special = state
        .special_roles
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AuthError::not_found("SpecialRole", &code))?;

    let mut details = state.with_roles(vec![special]).await?;
    Ok(Json(details.remove(0)))
}

/// Internal: look up special roles by codes
#[utoipa::path(
    post,
    path = "/special-roles/get-by-codes",
    tag = "internal",
    operation_id = "postInternalSpecialRolesByCodes",
    request_body = Vec<String>,
    responses(
        (status = 200, description = "Matching special roles", body = Vec<SpecialRoleDetailResponse>)
    )
)]
pub async fn get_special_roles_by_codes(
    State(state): State<SpecialRolesState>,
    Json(codes): Json<Vec<String>>,
) -> Result<Json<Vec<SpecialRoleDetailResponse>>, AuthError> {
    let specials = state.special_roles.find_by_codes(&codes).await?;
    Ok(Json(state.with_roles(specials).await?))
}

/// Create special roles router (admin surface)
pub fn special_roles_router(state: SpecialRolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_special_roles))
        .routes(routes!(get_special_role, update_special_role))
        .with_state(state)
}

/// Create internal router for sibling services
pub fn internal_router(state: SpecialRolesState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_special_role_by_code))
        .routes(routes!(get_special_roles_by_codes))
        .with_state(state)
}

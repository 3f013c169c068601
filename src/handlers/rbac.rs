// src/handlers/rbac.rs

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermUsuariosAdd, PermUsuariosChange, PermUsuariosView, RequirePermission},
    },
    models::rbac::{
        CreateModulePayload, CreateRolePayload, MatrixEntry, Module, PermissionFlags, Role,
        RoleModulePermission, SetPermissionPayload,
    },
};

#[utoipa::path(
    get,
    path = "/api/rbac/modules",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Módulos cadastrados", body = [Module]))
)]
pub async fn list_modules(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosView>,
) -> Result<Json<Vec<Module>>, AppError> {
    let modules = app_state.rbac_service.list_modules().await?;
    Ok(Json(modules))
}

#[utoipa::path(
    post,
    path = "/api/rbac/modules",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = CreateModulePayload,
    responses(
        (status = 201, description = "Módulo criado", body = Module),
        (status = 409, description = "Código de módulo já em uso"),
    )
)]
pub async fn create_module(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosAdd>,
    Json(payload): Json<CreateModulePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let module = app_state
        .rbac_service
        .create_module(&payload.code, &payload.name, &payload.icon)
        .await?;
    Ok((StatusCode::CREATED, Json(module)))
}

// Cria o grupo e o cargo que o envolve.
#[utoipa::path(
    post,
    path = "/api/rbac/roles",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = CreateRolePayload,
    responses((status = 201, description = "Cargo criado", body = Role))
)]
pub async fn create_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosAdd>,
    Json(payload): Json<CreateRolePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let role = app_state.rbac_service.create_role(&payload.group_name).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

// Linha nova da matriz; o par (cargo, módulo) é único.
#[utoipa::path(
    post,
    path = "/api/rbac/permissions",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = SetPermissionPayload,
    responses(
        (status = 201, description = "Permissão criada", body = RoleModulePermission),
        (status = 409, description = "Par (cargo, módulo) já existe"),
    )
)]
pub async fn create_permission(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosAdd>,
    Json(payload): Json<SetPermissionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let flags = PermissionFlags {
        can_view: payload.can_view,
        can_add: payload.can_add,
        can_change: payload.can_change,
        can_delete: payload.can_delete,
    };
    let permission = app_state
        .rbac_service
        .create_permission(payload.role_id, &payload.module_code, flags)
        .await?;
    Ok((StatusCode::CREATED, Json(permission)))
}

#[utoipa::path(
    put,
    path = "/api/rbac/permissions",
    tag = "RBAC",
    security(("api_jwt" = [])),
    request_body = SetPermissionPayload,
    responses((status = 200, description = "Permissão atualizada", body = RoleModulePermission))
)]
pub async fn update_permission(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosChange>,
    Json(payload): Json<SetPermissionPayload>,
) -> Result<Json<RoleModulePermission>, AppError> {
    let flags = PermissionFlags {
        can_view: payload.can_view,
        can_add: payload.can_add,
        can_change: payload.can_change,
        can_delete: payload.can_delete,
    };
    let permission = app_state
        .rbac_service
        .update_permission(payload.role_id, &payload.module_code, flags)
        .await?;
    Ok(Json(permission))
}

// A matriz achatada para a tela de administração.
#[utoipa::path(
    get,
    path = "/api/rbac/matrix",
    tag = "RBAC",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Matriz (cargo x módulo)", body = [MatrixEntry]))
)]
pub async fn list_matrix(
    State(app_state): State<AppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosView>,
) -> Result<Json<Vec<MatrixEntry>>, AppError> {
    let matrix = app_state.rbac_service.list_matrix().await?;
    Ok(Json(matrix))
}

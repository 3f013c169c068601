// src/handlers/users.rs
//
// Perfil do próprio usuário, listagem escopada de usuários e a
// administração de organizações.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermUsuariosChange, PermUsuariosDelete, PermUsuariosView, RequirePermission,
        },
    },
    models::auth::User,
    models::tenancy::{
        Organization, UpdateOrganizationPayload, UpdateProfilePayload, UserProfile,
    },
};

#[utoipa::path(
    get,
    path = "/api/users/me/profile",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Perfil do usuário", body = UserProfile))
)]
pub async fn get_my_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    let profile = app_state.tenancy_service.my_profile(&user).await?;
    Ok(Json(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/me/profile",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = UpdateProfilePayload,
    responses(
        (status = 200, description = "Perfil atualizado", body = UserProfile),
        (status = 409, description = "E-mail ou RUT já em uso"),
    )
)]
pub async fn update_my_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<UserProfile>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let profile = app_state.tenancy_service.update_profile(&user, &payload).await?;
    Ok(Json(profile))
}

// Usuários visíveis sob o escopo (os com perfil na organização).
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Usuários da organização", body = [User]))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosView>,
) -> Result<Json<Vec<User>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let users = app_state.tenancy_service.list_users(&scope).await?;
    Ok(Json(users))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignGroupPayload {
    #[validate(length(min = 1, message = "O nome do grupo é obrigatório."))]
    pub group_name: String,
}

// Vincula um usuário da organização a um grupo de autorização.
#[utoipa::path(
    post,
    path = "/api/users/{id}/groups",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = AssignGroupPayload,
    responses(
        (status = 204, description = "Grupo vinculado"),
        (status = 404, description = "Usuário fora do escopo"),
    )
)]
pub async fn assign_group(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AssignGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    // O alvo precisa ser visível sob o escopo do autor.
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let visible = app_state.tenancy_service.list_users(&scope).await?;
    if !visible.iter().any(|u| u.id == id) {
        return Err(AppError::NotFound);
    }

    app_state.rbac_service.assign_user_to_group(id, &payload.group_name).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Organizações
// ---

#[utoipa::path(
    get,
    path = "/api/organizations/me",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Organização do usuário", body = Organization))
)]
pub async fn my_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Organization>, AppError> {
    let organization = app_state.tenancy_service.my_organization(&user).await?;
    Ok(Json(organization))
}

#[utoipa::path(
    get,
    path = "/api/organizations",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Organizações visíveis", body = [Organization]))
)]
pub async fn list_organizations(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosView>,
) -> Result<Json<Vec<Organization>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let organizations = app_state.tenancy_service.list_organizations(&scope).await?;
    Ok(Json(organizations))
}

// Visão de auditoria (inclui tombstones); somente superusuários.
#[utoipa::path(
    get,
    path = "/api/organizations/all",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Todas as organizações", body = [Organization]))
)]
pub async fn list_organizations_all(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Vec<Organization>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let organizations =
        app_state.tenancy_service.list_organizations_all(&user, &scope).await?;
    Ok(Json(organizations))
}

#[utoipa::path(
    put,
    path = "/api/organizations/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    request_body = UpdateOrganizationPayload,
    responses(
        (status = 200, description = "Organização atualizada", body = Organization),
        (status = 404, description = "Organização fora do escopo"),
    )
)]
pub async fn update_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrganizationPayload>,
) -> Result<Json<Organization>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let organization =
        app_state.tenancy_service.update_organization(&scope, id, &payload).await?;
    Ok(Json(organization))
}

#[utoipa::path(
    delete,
    path = "/api/organizations/{id}",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Organização excluída (lógico)"))
)]
pub async fn delete_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermUsuariosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.tenancy_service.delete_organization(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/organizations/{id}/restore",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Organização restaurada"))
)]
pub async fn restore_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.tenancy_service.restore_organization(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Exclusão física, irreversível. Manutenção privilegiada.
#[utoipa::path(
    delete,
    path = "/api/organizations/{id}/hard",
    tag = "Users",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Organização removida definitivamente"))
)]
pub async fn hard_delete_organization(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.tenancy_service.hard_delete_organization(&user, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

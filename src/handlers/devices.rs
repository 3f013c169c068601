// src/handlers/devices.rs
//
// CRUD dos dispositivos e da taxonomia (categorias e zonas).
// Cada entrada declara o par módulo/ação exigido no tipo do guardião;
// a camada de escopo cuida do resto.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    common::pagination::{PageParams, Paginated},
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{
            PermDispositivosAdd, PermDispositivosChange, PermDispositivosDelete,
            PermDispositivosView, RequirePermission,
        },
    },
    models::devices::{
        Category, CreateCategoryPayload, CreateDevicePayload, CreateSensorPayload,
        CreateZonePayload, Device, DeviceDetail, DeviceListFilter, Sensor,
        UpdateCategoryPayload, UpdateDevicePayload, UpdateSensorPayload, UpdateZonePayload, Zone,
    },
};

// ---
// Dispositivos
// ---

#[utoipa::path(
    get,
    path = "/api/devices",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    params(PageParams),
    responses((status = 200, description = "Dispositivos da organização"))
)]
pub async fn list_devices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
    Query(filter): Query<DeviceListFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Device>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let (devices, total) = app_state.device_service.list_devices(&scope, &filter, &page).await?;
    Ok(Json(Paginated::new(devices, total, &page)))
}

#[utoipa::path(
    get,
    path = "/api/devices/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Detalhe com medições e alertas", body = DeviceDetail),
        (status = 404, description = "Dispositivo fora do escopo"),
    )
)]
pub async fn get_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
    Path(id): Path<Uuid>,
) -> Result<Json<DeviceDetail>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let detail = app_state.device_service.get_device_detail(&scope, id).await?;
    Ok(Json(detail))
}

#[utoipa::path(
    post,
    path = "/api/devices",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = CreateDevicePayload,
    responses(
        (status = 201, description = "Dispositivo criado", body = Device),
        (status = 404, description = "Categoria ou zona fora do escopo"),
    )
)]
pub async fn create_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateDevicePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let device = app_state.device_service.create_device(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(device)))
}

#[utoipa::path(
    put,
    path = "/api/devices/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = UpdateDevicePayload,
    responses(
        (status = 200, description = "Dispositivo atualizado", body = Device),
        (status = 404, description = "Dispositivo fora do escopo"),
    )
)]
pub async fn update_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateDevicePayload>,
) -> Result<Json<Device>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let device = app_state.device_service.update_device(&scope, id, &payload).await?;
    Ok(Json(device))
}

// Exclusão padrão: lógica. O histórico do dispositivo permanece.
#[utoipa::path(
    delete,
    path = "/api/devices/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Dispositivo excluído (lógico)"))
)]
pub async fn delete_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.delete_device(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/devices/{id}/restore",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Dispositivo restaurado"))
)]
pub async fn restore_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.restore_device(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/devices/{id}/hard",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Dispositivo removido definitivamente"))
)]
pub async fn hard_delete_device(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.hard_delete_device(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Categorias
// ---

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Categorias da organização", body = [Category]))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
) -> Result<Json<Vec<Category>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let categories = app_state.device_service.list_categories(&scope).await?;
    Ok(Json(categories))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = CreateCategoryPayload,
    responses((status = 201, description = "Categoria criada", body = Category))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateCategoryPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let category = app_state.device_service.create_category(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(category)))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = UpdateCategoryPayload,
    responses((status = 200, description = "Categoria atualizada", body = Category))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCategoryPayload>,
) -> Result<Json<Category>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let category = app_state.device_service.update_category(&scope, id, &payload).await?;
    Ok(Json(category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Categoria excluída (lógico)"))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.delete_category(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/categories/{id}/restore",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Categoria restaurada"))
)]
pub async fn restore_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.restore_category(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// Exclusão física: a cascata de FK arrasta os dispositivos dependentes.
#[utoipa::path(
    delete,
    path = "/api/categories/{id}/hard",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Categoria removida definitivamente"))
)]
pub async fn hard_delete_category(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.hard_delete_category(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Zonas
// ---

#[utoipa::path(
    get,
    path = "/api/zones",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Zonas da organização", body = [Zone]))
)]
pub async fn list_zones(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
) -> Result<Json<Vec<Zone>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let zones = app_state.device_service.list_zones(&scope).await?;
    Ok(Json(zones))
}

#[utoipa::path(
    post,
    path = "/api/zones",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = CreateZonePayload,
    responses((status = 201, description = "Zona criada", body = Zone))
)]
pub async fn create_zone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateZonePayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let zone = app_state.device_service.create_zone(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(zone)))
}

#[utoipa::path(
    put,
    path = "/api/zones/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = UpdateZonePayload,
    responses((status = 200, description = "Zona atualizada", body = Zone))
)]
pub async fn update_zone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateZonePayload>,
) -> Result<Json<Zone>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let zone = app_state.device_service.update_zone(&scope, id, &payload).await?;
    Ok(Json(zone))
}

#[utoipa::path(
    delete,
    path = "/api/zones/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Zona excluída (lógico)"))
)]
pub async fn delete_zone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.delete_zone(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/zones/{id}/restore",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Zona restaurada"))
)]
pub async fn restore_zone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.restore_zone(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    delete,
    path = "/api/zones/{id}/hard",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Zona removida definitivamente"))
)]
pub async fn hard_delete_zone(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.hard_delete_zone(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Sensores
// ---

#[utoipa::path(
    get,
    path = "/api/sensors",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Sensores da organização", body = [Sensor]))
)]
pub async fn list_sensors(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
) -> Result<Json<Vec<Sensor>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let sensors = app_state.device_service.list_sensors(&scope).await?;
    Ok(Json(sensors))
}

#[utoipa::path(
    post,
    path = "/api/sensors",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = CreateSensorPayload,
    responses((status = 201, description = "Sensor criado", body = Sensor))
)]
pub async fn create_sensor(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateSensorPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let sensor = app_state.device_service.create_sensor(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(sensor)))
}

#[utoipa::path(
    put,
    path = "/api/sensors/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    request_body = UpdateSensorPayload,
    responses((status = 200, description = "Sensor atualizado", body = Sensor))
)]
pub async fn update_sensor(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateSensorPayload>,
) -> Result<Json<Sensor>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let sensor = app_state.device_service.update_sensor(&scope, id, &payload).await?;
    Ok(Json(sensor))
}

#[utoipa::path(
    delete,
    path = "/api/sensors/{id}",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Sensor excluído (lógico)"))
)]
pub async fn delete_sensor(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.delete_sensor(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/sensors/{id}/restore",
    tag = "Dispositivos",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Sensor restaurado"))
)]
pub async fn restore_sensor(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.device_service.restore_sensor(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

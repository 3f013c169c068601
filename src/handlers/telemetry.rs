// src/handlers/telemetry.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::ToSchema;
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
    models::telemetry::{
        Alert, AlertListFilter, CreateAlertPayload, CreateMeasurementPayload, Measurement,
        MeasurementListFilter, UpdateMeasurementPayload,
    },
};

// ---
// Medições
// ---

#[utoipa::path(
    get,
    path = "/api/measurements",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    params(PageParams),
    responses((status = 200, description = "Medições da organização"))
)]
pub async fn list_measurements(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
    Query(filter): Query<MeasurementListFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Measurement>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let (measurements, total) =
        app_state.telemetry_service.list_measurements(&scope, &filter, &page).await?;
    Ok(Json(Paginated::new(measurements, total, &page)))
}

#[utoipa::path(
    post,
    path = "/api/measurements",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    request_body = CreateMeasurementPayload,
    responses(
        (status = 201, description = "Medição registrada", body = Measurement),
        (status = 404, description = "Dispositivo fora do escopo"),
    )
)]
pub async fn create_measurement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateMeasurementPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let measurement = app_state.telemetry_service.create_measurement(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(measurement)))
}

#[utoipa::path(
    put,
    path = "/api/measurements/{id}",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    request_body = UpdateMeasurementPayload,
    responses((status = 200, description = "Medição atualizada", body = Measurement))
)]
pub async fn update_measurement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateMeasurementPayload>,
) -> Result<Json<Measurement>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let measurement =
        app_state.telemetry_service.update_measurement(&scope, id, &payload).await?;
    Ok(Json(measurement))
}

#[utoipa::path(
    delete,
    path = "/api/measurements/{id}",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Medição excluída (lógico)"))
)]
pub async fn delete_measurement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.telemetry_service.delete_measurement(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/api/measurements/{id}/restore",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Medição restaurada"))
)]
pub async fn restore_measurement(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.telemetry_service.restore_measurement(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Alertas
// ---

#[utoipa::path(
    get,
    path = "/api/alerts",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    params(PageParams),
    responses((status = 200, description = "Alertas da organização"))
)]
pub async fn list_alerts(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
    Query(filter): Query<AlertListFilter>,
    Query(page): Query<PageParams>,
) -> Result<Json<Paginated<Alert>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let (alerts, total) = app_state.telemetry_service.list_alerts(&scope, &filter, &page).await?;
    Ok(Json(Paginated::new(alerts, total, &page)))
}

#[utoipa::path(
    post,
    path = "/api/alerts",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    request_body = CreateAlertPayload,
    responses(
        (status = 201, description = "Alerta registrado", body = Alert),
        (status = 404, description = "Dispositivo fora do escopo"),
    )
)]
pub async fn create_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosAdd>,
    Json(payload): Json<CreateAlertPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let alert = app_state.telemetry_service.create_alert(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(alert)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadPayload {
    pub read: bool,
}

#[utoipa::path(
    patch,
    path = "/api/alerts/{id}/read",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    request_body = MarkReadPayload,
    responses((status = 200, description = "Alerta marcado", body = Alert))
)]
pub async fn mark_alert_read(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosChange>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MarkReadPayload>,
) -> Result<Json<Alert>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let alert = app_state.telemetry_service.mark_alert_read(&scope, id, payload.read).await?;
    Ok(Json(alert))
}

#[utoipa::path(
    delete,
    path = "/api/alerts/{id}",
    tag = "Telemetria",
    security(("api_jwt" = [])),
    responses((status = 204, description = "Alerta excluído (lógico)"))
)]
pub async fn delete_alert(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosDelete>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    app_state.telemetry_service.delete_alert(&scope, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// src/handlers/dashboard.rs

use axum::{Json, extract::State};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::{
        auth::AuthenticatedUser,
        rbac::{PermDispositivosView, RequirePermission},
    },
    models::dashboard::{
        AdminOverview, DashboardResponse, DeviceExportRow, MeasurementExportRow,
    },
};

// O dashboard da organização. Sem organização resolvida, vem vazio.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Indicadores da organização", body = DashboardResponse))
)]
pub async fn get_dashboard(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<DashboardResponse>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let dashboard = app_state.dashboard_service.organization_dashboard(&scope).await?;
    Ok(Json(dashboard))
}

// Totais globais; somente superusuários.
#[utoipa::path(
    get,
    path = "/api/dashboard/admin",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses(
        (status = 200, description = "Totais globais", body = AdminOverview),
        (status = 403, description = "Requer superusuário"),
    )
)]
pub async fn admin_overview(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<AdminOverview>, AppError> {
    let overview = app_state.dashboard_service.admin_overview(&user).await?;
    Ok(Json(overview))
}

// ---
// Exportações (linhas prontas para a planilha; o arquivo é do cliente)
// ---

#[utoipa::path(
    get,
    path = "/api/export/devices",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Linhas de dispositivos", body = [DeviceExportRow]))
)]
pub async fn export_devices(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
) -> Result<Json<Vec<DeviceExportRow>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let rows = app_state.dashboard_service.export_devices(&scope).await?;
    Ok(Json(rows))
}

#[utoipa::path(
    get,
    path = "/api/export/measurements",
    tag = "Dashboard",
    security(("api_jwt" = [])),
    responses((status = 200, description = "Linhas de medições", body = [MeasurementExportRow]))
)]
pub async fn export_measurements(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    _guard: RequirePermission<PermDispositivosView>,
) -> Result<Json<Vec<MeasurementExportRow>>, AppError> {
    let scope = app_state.tenancy_service.scope_for(&user).await?;
    let rows = app_state.dashboard_service.export_measurements(&scope).await?;
    Ok(Json(rows))
}

// src/services/dashboard_service.rs

use chrono::{Duration, Utc};

use crate::{
    common::error::AppError,
    db::{DashboardRepository, TenantScope},
    models::auth::User,
    models::dashboard::{
        AdminOverview, DashboardResponse, DeviceExportRow, MeasurementExportRow,
    },
};

#[derive(Clone)]
pub struct DashboardService {
    repo: DashboardRepository,
}

impl DashboardService {
    pub fn new(repo: DashboardRepository) -> Self {
        Self { repo }
    }

    // O dashboard da organização do usuário. Sem organização resolvida,
    // a resposta é o dashboard vazio, nunca um erro: a camada de
    // apresentação conta com isso.
    pub async fn organization_dashboard(
        &self,
        scope: &TenantScope,
    ) -> Result<DashboardResponse, AppError> {
        let Some(organization_id) = scope.organization_id else {
            return Ok(DashboardResponse {
                summary: Default::default(),
                latest_measurements: Vec::new(),
                zones_with_devices: Vec::new(),
                recent_devices: Vec::new(),
                alert_counts: Default::default(),
                recent_alerts: Vec::new(),
                measurements_by_day: Vec::new(),
            });
        };

        let week_ago = Utc::now() - Duration::days(7);

        let summary = self.repo.get_summary(organization_id).await?;
        let latest_measurements = self.repo.latest_measurements(organization_id, 10).await?;
        let zones_with_devices = self.repo.zones_with_devices(organization_id).await?;
        let recent_devices = self.repo.recent_devices(organization_id, 5).await?;
        let alert_counts = self.repo.alert_counts_since(organization_id, week_ago).await?;
        let recent_alerts = self.repo.recent_alerts(organization_id, 5).await?;
        let measurements_by_day =
            self.repo.measurements_per_day(organization_id, week_ago).await?;

        Ok(DashboardResponse {
            summary,
            latest_measurements,
            zones_with_devices,
            recent_devices,
            alert_counts,
            recent_alerts,
            measurements_by_day,
        })
    }

    // Totais globais do painel administrativo.
    pub async fn admin_overview(&self, user: &User) -> Result<AdminOverview, AppError> {
        if !user.is_superuser {
            return Err(AppError::PermissionDenied);
        }
        self.repo.admin_overview().await
    }

    // ---
    // Projeções de exportação (somente linhas vivas)
    // ---

    pub async fn export_devices(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<DeviceExportRow>, AppError> {
        self.repo.export_devices(scope).await
    }

    pub async fn export_measurements(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<MeasurementExportRow>, AppError> {
        self.repo.export_measurements(scope).await
    }
}

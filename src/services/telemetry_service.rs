// src/services/telemetry_service.rs
//
// Medições e alertas escopados. As duas entidades não carregam o filtro
// de organização diretamente: o escopo atravessa o dispositivo dono.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    db::{LifecycleManager, TelemetryRepository, TenantScope},
    models::devices::Device,
    models::telemetry::{
        Alert, AlertListFilter, CreateAlertPayload, CreateMeasurementPayload, Measurement,
        MeasurementListFilter, UpdateMeasurementPayload,
    },
};

#[derive(Clone)]
pub struct TelemetryService {
    repo: TelemetryRepository,
    devices: LifecycleManager<Device>,
    measurements: LifecycleManager<Measurement>,
    alerts: LifecycleManager<Alert>,
    pool: PgPool,
}

impl TelemetryService {
    pub fn new(repo: TelemetryRepository, pool: PgPool) -> Self {
        Self {
            repo,
            devices: LifecycleManager::new(pool.clone()),
            measurements: LifecycleManager::new(pool.clone()),
            alerts: LifecycleManager::new(pool.clone()),
            pool,
        }
    }

    // ---
    // Medições
    // ---

    pub async fn list_measurements(
        &self,
        scope: &TenantScope,
        filter: &MeasurementListFilter,
        page: &PageParams,
    ) -> Result<(Vec<Measurement>, i64), AppError> {
        self.repo
            .list_measurements(scope, filter.device_id, filter.sort.as_deref(), page)
            .await
    }

    pub async fn create_measurement(
        &self,
        scope: &TenantScope,
        payload: &CreateMeasurementPayload,
    ) -> Result<Measurement, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;

        // O dispositivo precisa ser visível sob o escopo do autor.
        self.devices
            .find_live(&mut *tx, scope, payload.device_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let measurement = self
            .repo
            .create_measurement(
                &mut *tx,
                organization_id,
                payload.device_id,
                payload.value,
                &payload.unit,
                payload.date,
            )
            .await?;
        tx.commit().await?;
        Ok(measurement)
    }

    pub async fn update_measurement(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateMeasurementPayload,
    ) -> Result<Measurement, AppError> {
        let mut tx = self.pool.begin().await?;
        self.measurements.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        let measurement = self
            .repo
            .update_measurement(
                &mut *tx,
                id,
                payload.value,
                payload.unit.as_deref(),
                payload.date,
                payload.status,
            )
            .await?;
        tx.commit().await?;
        Ok(measurement)
    }

    pub async fn delete_measurement(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.measurements.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.measurements.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore_measurement(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.measurements.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.measurements.restore(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Alertas
    // ---

    pub async fn list_alerts(
        &self,
        scope: &TenantScope,
        filter: &AlertListFilter,
        page: &PageParams,
    ) -> Result<(Vec<Alert>, i64), AppError> {
        self.repo.list_alerts(scope, filter, page).await
    }

    pub async fn create_alert(
        &self,
        scope: &TenantScope,
        payload: &CreateAlertPayload,
    ) -> Result<Alert, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;

        self.devices
            .find_live(&mut *tx, scope, payload.device_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let alert = self
            .repo
            .create_alert(&mut *tx, organization_id, payload.device_id, &payload.message, payload.level)
            .await?;
        tx.commit().await?;
        Ok(alert)
    }

    pub async fn mark_alert_read(
        &self,
        scope: &TenantScope,
        id: Uuid,
        read: bool,
    ) -> Result<Alert, AppError> {
        let mut tx = self.pool.begin().await?;
        self.alerts.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        let alert = self.repo.mark_alert_read(&mut *tx, id, read).await?;
        tx.commit().await?;
        Ok(alert)
    }

    pub async fn delete_alert(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.alerts.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.alerts.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }
}

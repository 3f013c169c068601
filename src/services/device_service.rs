// src/services/device_service.rs
//
// CRUD escopado de categorias, zonas, dispositivos e sensores.
// Toda mutação re-busca o alvo sob o escopo do usuário antes de tocar
// nele: linha de outro tenant responde NotFound, nunca Forbidden.

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    common::pagination::PageParams,
    db::{DeviceRepository, LifecycleManager, TelemetryRepository, TenantScope},
    models::devices::{
        Category, CreateCategoryPayload, CreateDevicePayload, CreateSensorPayload,
        CreateZonePayload, Device, DeviceDetail, DeviceListFilter, Sensor,
        UpdateCategoryPayload, UpdateDevicePayload, UpdateSensorPayload, UpdateZonePayload, Zone,
    },
};

#[derive(Clone)]
pub struct DeviceService {
    repo: DeviceRepository,
    telemetry_repo: TelemetryRepository,
    categories: LifecycleManager<Category>,
    zones: LifecycleManager<Zone>,
    devices: LifecycleManager<Device>,
    sensors: LifecycleManager<Sensor>,
    pool: PgPool,
}

impl DeviceService {
    pub fn new(repo: DeviceRepository, telemetry_repo: TelemetryRepository, pool: PgPool) -> Self {
        Self {
            repo,
            telemetry_repo,
            categories: LifecycleManager::new(pool.clone()),
            zones: LifecycleManager::new(pool.clone()),
            devices: LifecycleManager::new(pool.clone()),
            sensors: LifecycleManager::new(pool.clone()),
            pool,
        }
    }

    // ---
    // Categorias
    // ---

    pub async fn list_categories(&self, scope: &TenantScope) -> Result<Vec<Category>, AppError> {
        self.categories.list_live(scope).await
    }

    pub async fn create_category(
        &self,
        scope: &TenantScope,
        payload: &CreateCategoryPayload,
    ) -> Result<Category, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;
        let category = self
            .repo
            .create_category(&mut *tx, organization_id, &payload.name, &payload.description)
            .await?;
        tx.commit().await?;
        Ok(category)
    }

    pub async fn update_category(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateCategoryPayload,
    ) -> Result<Category, AppError> {
        let mut tx = self.pool.begin().await?;
        self.categories.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        let category = self
            .repo
            .update_category(
                &mut *tx,
                id,
                payload.name.as_deref(),
                payload.description.as_deref(),
                payload.status,
            )
            .await?;
        tx.commit().await?;
        Ok(category)
    }

    // Exclusão lógica: os dispositivos da categoria continuam vivos.
    pub async fn delete_category(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.categories.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.categories.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore_category(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.categories.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.categories.restore(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // Exclusão física: a cascata de FK arrasta os dispositivos dependentes
    // e, destes, sensores/medições/alertas. Irreversível.
    pub async fn hard_delete_category(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.categories.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.categories.hard_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Zonas
    // ---

    pub async fn list_zones(&self, scope: &TenantScope) -> Result<Vec<Zone>, AppError> {
        self.zones.list_live(scope).await
    }

    pub async fn create_zone(
        &self,
        scope: &TenantScope,
        payload: &CreateZonePayload,
    ) -> Result<Zone, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;
        let zone = self
            .repo
            .create_zone(&mut *tx, organization_id, &payload.name, &payload.description)
            .await?;
        tx.commit().await?;
        Ok(zone)
    }

    pub async fn update_zone(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateZonePayload,
    ) -> Result<Zone, AppError> {
        let mut tx = self.pool.begin().await?;
        self.zones.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        let zone = self
            .repo
            .update_zone(
                &mut *tx,
                id,
                payload.name.as_deref(),
                payload.description.as_deref(),
                payload.status,
            )
            .await?;
        tx.commit().await?;
        Ok(zone)
    }

    pub async fn delete_zone(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.zones.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.zones.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore_zone(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.zones.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.zones.restore(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn hard_delete_zone(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.zones.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.zones.hard_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Dispositivos
    // ---

    pub async fn list_devices(
        &self,
        scope: &TenantScope,
        filter: &DeviceListFilter,
        page: &PageParams,
    ) -> Result<(Vec<Device>, i64), AppError> {
        self.repo.list_devices(scope, filter, page).await
    }

    pub async fn get_device(&self, scope: &TenantScope, id: Uuid) -> Result<Device, AppError> {
        self.devices
            .find_live(self.pool(), scope, id)
            .await?
            .ok_or(AppError::NotFound)
    }

    // Detalhe com o histórico vivo de medições e alertas.
    pub async fn get_device_detail(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<DeviceDetail, AppError> {
        let device = self.get_device(scope, id).await?;
        let measurements = self.telemetry_repo.measurements_for_device(device.id).await?;
        let alerts = self.telemetry_repo.alerts_for_device(device.id).await?;
        Ok(DeviceDetail { device, measurements, alerts })
    }

    pub async fn create_device(
        &self,
        scope: &TenantScope,
        payload: &CreateDevicePayload,
    ) -> Result<Device, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;

        // Referências de categoria/zona também obedecem ao escopo:
        // apontar para taxonomia de outro tenant é NotFound.
        self.categories
            .find_live(&mut *tx, scope, payload.category_id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.zones
            .find_live(&mut *tx, scope, payload.zone_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let device = self
            .repo
            .create_device(
                &mut *tx,
                organization_id,
                &payload.name,
                &payload.reference,
                payload.category_id,
                payload.zone_id,
            )
            .await?;
        tx.commit().await?;
        Ok(device)
    }

    pub async fn update_device(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateDevicePayload,
    ) -> Result<Device, AppError> {
        let mut tx = self.pool.begin().await?;
        self.devices.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;

        if let Some(category_id) = payload.category_id {
            self.categories
                .find_live(&mut *tx, scope, category_id)
                .await?
                .ok_or(AppError::NotFound)?;
        }
        if let Some(zone_id) = payload.zone_id {
            self.zones.find_live(&mut *tx, scope, zone_id).await?.ok_or(AppError::NotFound)?;
        }

        let device = self
            .repo
            .update_device(
                &mut *tx,
                id,
                payload.name.as_deref(),
                payload.reference.as_deref(),
                payload.category_id,
                payload.zone_id,
                payload.status,
            )
            .await?;
        tx.commit().await?;
        Ok(device)
    }

    // Exclusão padrão: tombstone. Medições e alertas do dispositivo
    // permanecem para histórico.
    pub async fn delete_device(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.devices.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.devices.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore_device(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.devices.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.devices.restore(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn hard_delete_device(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.devices.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.devices.hard_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Sensores
    // ---

    pub async fn list_sensors(&self, scope: &TenantScope) -> Result<Vec<Sensor>, AppError> {
        self.sensors.list_live(scope).await
    }

    pub async fn create_sensor(
        &self,
        scope: &TenantScope,
        payload: &CreateSensorPayload,
    ) -> Result<Sensor, AppError> {
        let organization_id = scope.stamp_organization()?;
        let mut tx = self.pool.begin().await?;

        self.devices
            .find_live(&mut *tx, scope, payload.device_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let sensor = self
            .repo
            .create_sensor(
                &mut *tx,
                organization_id,
                payload.device_id,
                &payload.name,
                &payload.sensor_type,
                &payload.unit,
            )
            .await?;
        tx.commit().await?;
        Ok(sensor)
    }

    pub async fn update_sensor(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateSensorPayload,
    ) -> Result<Sensor, AppError> {
        let mut tx = self.pool.begin().await?;
        self.sensors.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        let sensor = self
            .repo
            .update_sensor(
                &mut *tx,
                id,
                payload.name.as_deref(),
                payload.sensor_type.as_deref(),
                payload.unit.as_deref(),
                payload.status,
            )
            .await?;
        tx.commit().await?;
        Ok(sensor)
    }

    pub async fn delete_sensor(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.sensors.find_live(&mut *tx, scope, id).await?.ok_or(AppError::NotFound)?;
        self.sensors.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn restore_sensor(&self, scope: &TenantScope, id: Uuid) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        if !self.sensors.exists_scoped(&mut *tx, scope, id).await? {
            return Err(AppError::NotFound);
        }
        self.sensors.restore(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }
}

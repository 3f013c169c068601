// src/db/dashboard_repo.rs

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::scope::{TenantScope, Visibility};
use crate::models::dashboard::{
    AdminOverview, AlertCounts, DashboardSummary, DeviceExportRow, MeasurementExportRow,
    MeasurementsPerDay, RecentDevice, ZoneDeviceCount,
};
use crate::models::telemetry::{Alert, AlertLevel, Measurement};

#[derive(Clone)]
pub struct DashboardRepository {
    pool: PgPool,
}

impl DashboardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Totais da organização numa transação (snapshot consistente).
    pub async fn get_summary(&self, organization_id: Uuid) -> Result<DashboardSummary, AppError> {
        let mut tx = self.pool.begin().await?;

        let total_devices: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM devices WHERE organization_id = $1 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        let total_measurements: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM measurements m
            WHERE m.deleted_at IS NULL
              AND m.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            "#,
        )
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        let total_alerts: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM alerts a
            WHERE a.deleted_at IS NULL
              AND a.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            "#,
        )
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        let total_zones: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM zones WHERE organization_id = $1 AND deleted_at IS NULL",
        )
        .bind(organization_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardSummary { total_devices, total_measurements, total_alerts, total_zones })
    }

    // Últimas medições da organização, mais recentes primeiro.
    pub async fn latest_measurements(
        &self,
        organization_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Measurement>, AppError> {
        let measurements = sqlx::query_as::<_, Measurement>(
            r#"
            SELECT m.* FROM measurements m
            WHERE m.deleted_at IS NULL
              AND m.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            ORDER BY m.date DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(measurements)
    }

    // Zonas com a contagem de dispositivos vivos, maiores primeiro.
    pub async fn zones_with_devices(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<ZoneDeviceCount>, AppError> {
        let zones = sqlx::query_as::<_, ZoneDeviceCount>(
            r#"
            SELECT z.id AS zone_id, z.name AS zone_name,
                   COUNT(d.id) FILTER (WHERE d.deleted_at IS NULL) AS device_count
            FROM zones z
            LEFT JOIN devices d ON d.zone_id = z.id
            WHERE z.organization_id = $1 AND z.deleted_at IS NULL
            GROUP BY z.id, z.name
            ORDER BY device_count DESC
            "#,
        )
        .bind(organization_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(zones)
    }

    pub async fn recent_devices(
        &self,
        organization_id: Uuid,
        limit: i64,
    ) -> Result<Vec<RecentDevice>, AppError> {
        let devices = sqlx::query_as::<_, RecentDevice>(
            r#"
            SELECT d.id, d.name, d.reference,
                   c.name AS category_name, z.name AS zone_name, d.created_at
            FROM devices d
            JOIN categories c ON c.id = d.category_id
            JOIN zones z ON z.id = d.zone_id
            WHERE d.organization_id = $1 AND d.deleted_at IS NULL
            ORDER BY d.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(devices)
    }

    // Alertas desde `since`, classificados por severidade.
    pub async fn alert_counts_since(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<AlertCounts, AppError> {
        let rows: Vec<(AlertLevel, i64)> = sqlx::query_as(
            r#"
            SELECT a.level, COUNT(*) FROM alerts a
            WHERE a.deleted_at IS NULL
              AND a.created_at >= $2
              AND a.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            GROUP BY a.level
            "#,
        )
        .bind(organization_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        let mut counts = AlertCounts::default();
        for (level, count) in rows {
            counts.set(level, count);
        }
        Ok(counts)
    }

    pub async fn recent_alerts(
        &self,
        organization_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Alert>, AppError> {
        let alerts = sqlx::query_as::<_, Alert>(
            r#"
            SELECT a.* FROM alerts a
            WHERE a.deleted_at IS NULL
              AND a.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            ORDER BY a.created_at DESC
            LIMIT $2
            "#,
        )
        .bind(organization_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }

    pub async fn measurements_per_day(
        &self,
        organization_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<MeasurementsPerDay>, AppError> {
        let rows = sqlx::query_as::<_, MeasurementsPerDay>(
            r#"
            SELECT m.date::date AS day, COUNT(*) AS count
            FROM measurements m
            WHERE m.deleted_at IS NULL
              AND m.date >= $2
              AND m.device_id IN (SELECT id FROM devices WHERE organization_id = $1)
            GROUP BY 1
            ORDER BY 1 ASC
            "#,
        )
        .bind(organization_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    // Totais globais (somente superusuário chega aqui).
    pub async fn admin_overview(&self) -> Result<AdminOverview, AppError> {
        let mut tx = self.pool.begin().await?;

        let total_users: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *tx).await?;
        let total_devices: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE deleted_at IS NULL")
                .fetch_one(&mut *tx)
                .await?;
        let total_measurements: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM measurements WHERE deleted_at IS NULL")
                .fetch_one(&mut *tx)
                .await?;
        let total_alerts: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM alerts WHERE deleted_at IS NULL")
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;

        Ok(AdminOverview { total_users, total_devices, total_measurements, total_alerts })
    }

    // ---
    // Projeções de exportação (sempre a visão viva)
    // ---

    pub async fn export_devices(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<DeviceExportRow>, AppError> {
        let base = r#"
            SELECT d.name, c.name AS category_name, z.name AS zone_name,
                   d.reference, d.status
            FROM devices d
            JOIN categories c ON c.id = d.category_id
            JOIN zones z ON z.id = d.zone_id
            WHERE d.deleted_at IS NULL
        "#;

        let rows = match scope.visibility() {
            Visibility::All => {
                sqlx::query_as::<_, DeviceExportRow>(&format!("{base} ORDER BY d.name"))
                    .fetch_all(&self.pool)
                    .await?
            }
            Visibility::Organization(org_id) => {
                sqlx::query_as::<_, DeviceExportRow>(&format!(
                    "{base} AND d.organization_id = $1 ORDER BY d.name"
                ))
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            Visibility::Nothing => Vec::new(),
        };
        Ok(rows)
    }

    pub async fn export_measurements(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<MeasurementExportRow>, AppError> {
        let base = r#"
            SELECT d.name AS device_name, m.value, m.unit, m.date
            FROM measurements m
            JOIN devices d ON d.id = m.device_id
            WHERE m.deleted_at IS NULL
        "#;

        let rows = match scope.visibility() {
            Visibility::All => {
                sqlx::query_as::<_, MeasurementExportRow>(&format!("{base} ORDER BY m.date DESC"))
                    .fetch_all(&self.pool)
                    .await?
            }
            Visibility::Organization(org_id) => {
                sqlx::query_as::<_, MeasurementExportRow>(&format!(
                    "{base} AND d.organization_id = $1 ORDER BY m.date DESC"
                ))
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?
            }
            Visibility::Nothing => Vec::new(),
        };
        Ok(rows)
    }
}

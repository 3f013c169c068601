// src/db/telemetry_repo.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::PageParams;
use crate::db::scope::{TenantScope, Visibility};
use crate::models::lifecycle::EntityStatus;
use crate::models::telemetry::{Alert, AlertLevel, AlertListFilter, Measurement};

#[derive(Clone)]
pub struct TelemetryRepository {
    pool: PgPool,
}

fn measurement_order(sort: Option<&str>) -> &'static str {
    match sort {
        Some("date") => "m.date ASC",
        Some("value") => "m.value ASC",
        Some("-value") => "m.value DESC",
        _ => "m.date DESC",
    }
}

// Cláusula de escopo atravessando o dispositivo dono, compartilhada
// pelas listagens de medições e alertas.
struct DeviceScopeClause {
    sql: Option<String>,
    org: Option<Uuid>,
}

impl DeviceScopeClause {
    fn build(visibility: Visibility, alias: &str, bind_index: usize) -> Option<Self> {
        match visibility {
            Visibility::All => Some(Self { sql: None, org: None }),
            Visibility::Organization(id) => Some(Self {
                sql: Some(format!(
                    "{alias}.device_id IN \
                     (SELECT id FROM devices WHERE organization_id = ${bind_index})"
                )),
                org: Some(id),
            }),
            Visibility::Nothing => None,
        }
    }
}

impl TelemetryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Medições
    // ---

    pub async fn list_measurements(
        &self,
        scope: &TenantScope,
        device_id: Option<Uuid>,
        sort: Option<&str>,
        page: &PageParams,
    ) -> Result<(Vec<Measurement>, i64), AppError> {
        let mut clauses = vec!["m.deleted_at IS NULL".to_string()];
        let mut bind_index = 0usize;

        let Some(device_scope) = DeviceScopeClause::build(scope.visibility(), "m", bind_index + 1)
        else {
            return Ok((Vec::new(), 0));
        };
        if let Some(sql) = &device_scope.sql {
            bind_index += 1;
            clauses.push(sql.clone());
        }

        let device_bind = device_id.map(|id| {
            bind_index += 1;
            clauses.push(format!("m.device_id = ${bind_index}"));
            id
        });

        let from_where = format!("FROM measurements m WHERE {}", clauses.join(" AND "));
        let count_sql = format!("SELECT COUNT(*) {from_where}");
        let select_sql = format!(
            "SELECT m.* {from_where} ORDER BY {} LIMIT ${} OFFSET ${}",
            measurement_order(sort),
            bind_index + 1,
            bind_index + 2,
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Measurement>(&select_sql);
        if let Some(org) = device_scope.org {
            count_query = count_query.bind(org);
            select_query = select_query.bind(org);
        }
        if let Some(id) = device_bind {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let measurements = select_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((measurements, total))
    }

    pub async fn create_measurement<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        device_id: Uuid,
        value: Decimal,
        unit: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<Measurement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let measurement = sqlx::query_as::<_, Measurement>(
            r#"
            INSERT INTO measurements (device_id, value, unit, date, organization_id)
            VALUES ($1, $2, $3, COALESCE($4, now()), $5)
            RETURNING *
            "#,
        )
        .bind(device_id)
        .bind(value)
        .bind(unit)
        .bind(date)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(measurement)
    }

    pub async fn update_measurement<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        value: Option<Decimal>,
        unit: Option<&str>,
        date: Option<DateTime<Utc>>,
        status: Option<EntityStatus>,
    ) -> Result<Measurement, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Measurement>(
            r#"
            UPDATE measurements
            SET value = COALESCE($2, value),
                unit = COALESCE($3, unit),
                date = COALESCE($4, date),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(value)
        .bind(unit)
        .bind(date)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    // Medições vivas de um dispositivo, mais recentes primeiro.
    pub async fn measurements_for_device(
        &self,
        device_id: Uuid,
    ) -> Result<Vec<Measurement>, AppError> {
        let measurements = sqlx::query_as::<_, Measurement>(
            r#"
            SELECT * FROM measurements
            WHERE device_id = $1 AND deleted_at IS NULL
            ORDER BY date DESC
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(measurements)
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
        let mut clauses = vec!["a.deleted_at IS NULL".to_string()];
        let mut bind_index = 0usize;

        let Some(device_scope) = DeviceScopeClause::build(scope.visibility(), "a", bind_index + 1)
        else {
            return Ok((Vec::new(), 0));
        };
        if let Some(sql) = &device_scope.sql {
            bind_index += 1;
            clauses.push(sql.clone());
        }

        let level_bind = filter.level.map(|level| {
            bind_index += 1;
            clauses.push(format!("a.level = ${bind_index}"));
            level
        });

        let read_bind = filter.read.map(|read| {
            bind_index += 1;
            clauses.push(format!("a.read = ${bind_index}"));
            read
        });

        let from_where = format!("FROM alerts a WHERE {}", clauses.join(" AND "));
        let count_sql = format!("SELECT COUNT(*) {from_where}");
        let select_sql = format!(
            "SELECT a.* {from_where} ORDER BY a.created_at DESC LIMIT ${} OFFSET ${}",
            bind_index + 1,
            bind_index + 2,
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Alert>(&select_sql);
        if let Some(org) = device_scope.org {
            count_query = count_query.bind(org);
            select_query = select_query.bind(org);
        }
        if let Some(level) = level_bind {
            count_query = count_query.bind(level);
            select_query = select_query.bind(level);
        }
        if let Some(read) = read_bind {
            count_query = count_query.bind(read);
            select_query = select_query.bind(read);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let alerts = select_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((alerts, total))
    }

    pub async fn create_alert<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        device_id: Uuid,
        message: &str,
        level: AlertLevel,
    ) -> Result<Alert, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let alert = sqlx::query_as::<_, Alert>(
            r#"
            INSERT INTO alerts (device_id, message, level, organization_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(device_id)
        .bind(message)
        .bind(level)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(alert)
    }

    pub async fn mark_alert_read<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        read: bool,
    ) -> Result<Alert, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Alert>(
            r#"
            UPDATE alerts
            SET read = $2, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(read)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn alerts_for_device(&self, device_id: Uuid) -> Result<Vec<Alert>, AppError> {
        let alerts = sqlx::query_as::<_, Alert>(
            r#"
            SELECT * FROM alerts
            WHERE device_id = $1 AND deleted_at IS NULL
            ORDER BY created_at DESC
            "#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(alerts)
    }
}

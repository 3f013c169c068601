// src/db/device_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::common::pagination::PageParams;
use crate::db::scope::{TenantScope, Visibility};
use crate::models::devices::{Category, Device, DeviceListFilter, Sensor, Zone};
use crate::models::lifecycle::EntityStatus;

#[derive(Clone)]
pub struct DeviceRepository {
    pool: PgPool,
}

// Ordenações aceitas pela listagem de dispositivos. A listagem monta SQL
// dinâmico, então o campo vem de uma lista fechada, nunca do cliente.
fn device_order(sort: Option<&str>) -> &'static str {
    match sort {
        Some("-name") => "d.name DESC",
        Some("reference") => "d.reference ASC",
        Some("-reference") => "d.reference DESC",
        Some("created_at") => "d.created_at ASC",
        Some("-created_at") => "d.created_at DESC",
        _ => "d.name ASC",
    }
}

impl DeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Listagem de dispositivos (busca + filtro de categoria + paginação)
    // ---
    // A busca cobre nome, referência e os nomes de categoria/zona,
    // como a tela de listagem original.
    pub async fn list_devices(
        &self,
        scope: &TenantScope,
        filter: &DeviceListFilter,
        page: &PageParams,
    ) -> Result<(Vec<Device>, i64), AppError> {
        let org_id = match scope.visibility() {
            Visibility::All => None,
            Visibility::Organization(id) => Some(id),
            Visibility::Nothing => return Ok((Vec::new(), 0)),
        };

        let mut clauses = vec!["d.deleted_at IS NULL".to_string()];
        let mut bind_index = 0usize;

        let org_bind = org_id.map(|id| {
            bind_index += 1;
            clauses.push(format!("d.organization_id = ${bind_index}"));
            id
        });

        let category_bind = filter.category_id.map(|id| {
            bind_index += 1;
            clauses.push(format!("d.category_id = ${bind_index}"));
            id
        });

        let search_bind = filter.search.as_ref().filter(|s| !s.trim().is_empty()).map(|s| {
            bind_index += 1;
            clauses.push(format!(
                "(d.name ILIKE ${i} OR d.reference ILIKE ${i} \
                 OR c.name ILIKE ${i} OR z.name ILIKE ${i})",
                i = bind_index
            ));
            format!("%{}%", s.trim())
        });

        let from_where = format!(
            "FROM devices d \
             JOIN categories c ON c.id = d.category_id \
             JOIN zones z ON z.id = d.zone_id \
             WHERE {}",
            clauses.join(" AND ")
        );

        let count_sql = format!("SELECT COUNT(*) {from_where}");
        let select_sql = format!(
            "SELECT d.* {from_where} ORDER BY {} LIMIT ${} OFFSET ${}",
            device_order(filter.sort.as_deref()),
            bind_index + 1,
            bind_index + 2,
        );

        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        let mut select_query = sqlx::query_as::<_, Device>(&select_sql);
        if let Some(id) = org_bind {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }
        if let Some(id) = category_bind {
            count_query = count_query.bind(id);
            select_query = select_query.bind(id);
        }
        if let Some(pattern) = search_bind {
            count_query = count_query.bind(pattern.clone());
            select_query = select_query.bind(pattern);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let devices = select_query
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok((devices, total))
    }

    // ---
    // Criações (a organização chega carimbada pela camada de escopo)
    // ---

    pub async fn create_category<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, organization_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(category)
    }

    pub async fn create_zone<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        name: &str,
        description: &str,
    ) -> Result<Zone, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let zone = sqlx::query_as::<_, Zone>(
            r#"
            INSERT INTO zones (name, description, organization_id)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(description)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(zone)
    }

    pub async fn create_device<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        name: &str,
        reference: &str,
        category_id: Uuid,
        zone_id: Uuid,
    ) -> Result<Device, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let device = sqlx::query_as::<_, Device>(
            r#"
            INSERT INTO devices (name, reference, category_id, zone_id, organization_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(reference)
        .bind(category_id)
        .bind(zone_id)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(device)
    }

    pub async fn create_sensor<'e, E>(
        &self,
        executor: E,
        organization_id: Uuid,
        device_id: Uuid,
        name: &str,
        sensor_type: &str,
        unit: &str,
    ) -> Result<Sensor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sensor = sqlx::query_as::<_, Sensor>(
            r#"
            INSERT INTO sensors (device_id, name, type, unit, organization_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(device_id)
        .bind(name)
        .bind(sensor_type)
        .bind(unit)
        .bind(organization_id)
        .fetch_one(executor)
        .await?;
        Ok(sensor)
    }

    // ---
    // Atualizações parciais
    // ---

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        status: Option<EntityStatus>,
    ) -> Result<Category, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn update_zone<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        description: Option<&str>,
        status: Option<EntityStatus>,
    ) -> Result<Zone, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Zone>(
            r#"
            UPDATE zones
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(description)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn update_device<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        reference: Option<&str>,
        category_id: Option<Uuid>,
        zone_id: Option<Uuid>,
        status: Option<EntityStatus>,
    ) -> Result<Device, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Device>(
            r#"
            UPDATE devices
            SET name = COALESCE($2, name),
                reference = COALESCE($3, reference),
                category_id = COALESCE($4, category_id),
                zone_id = COALESCE($5, zone_id),
                status = COALESCE($6, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(reference)
        .bind(category_id)
        .bind(zone_id)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn update_sensor<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        sensor_type: Option<&str>,
        unit: Option<&str>,
        status: Option<EntityStatus>,
    ) -> Result<Sensor, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Sensor>(
            r#"
            UPDATE sensors
            SET name = COALESCE($2, name),
                type = COALESCE($3, type),
                unit = COALESCE($4, unit),
                status = COALESCE($5, status),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(sensor_type)
        .bind(unit)
        .bind(status)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_falls_back_to_name_for_unknown_fields() {
        assert_eq!(device_order(None), "d.name ASC");
        assert_eq!(device_order(Some("-name")), "d.name DESC");
        // Campo fora da lista fechada não chega ao SQL.
        assert_eq!(device_order(Some("id; DROP TABLE devices")), "d.name ASC");
    }
}

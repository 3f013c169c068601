// src/db/lifecycle.rs
//
// O gerenciador genérico de exclusão lógica. Existe UMA implementação,
// parametrizada pela entidade; as famílias de entidades não duplicam a
// lógica de tombstone.
//
// Duas visões paralelas: list_live (padrão, deleted_at IS NULL) e
// list_all (auditoria). Toda consulta de negócio passa pela primeira.

use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::scope::{OrgRelation, TenantScope, Visibility};
use crate::models::devices::{Category, Device, Sensor, Zone};
use crate::models::telemetry::{Alert, Measurement};
use crate::models::tenancy::Organization;

// Entidade que participa do ciclo de vida (tombstone + escopo).
pub trait LifecycleModel: Send + Unpin + for<'r> FromRow<'r, PgRow> {
    const TABLE: &'static str;
    const ORG: OrgRelation;
}

#[derive(Clone)]
pub struct LifecycleManager<T> {
    pool: PgPool,
    _model: PhantomData<fn() -> T>,
}

impl<T: LifecycleModel> LifecycleManager<T> {
    pub fn new(pool: PgPool) -> Self {
        Self { pool, _model: PhantomData }
    }

    // Tombstone: marca deleted_at e nunca remove a linha. Idempotente:
    // excluir algo já excluído apenas atualiza o carimbo, sem erro.
    pub async fn soft_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<DateTime<Utc>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET deleted_at = now(), updated_at = now() WHERE id = $1 RETURNING deleted_at",
            T::TABLE
        );
        sqlx::query_scalar::<_, Option<DateTime<Utc>>>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?
            .flatten()
            .ok_or(AppError::NotFound)
    }

    // Remove a linha de verdade; as dependentes caem pela cascata de FK.
    // Irreversível: some também da visão de auditoria.
    pub async fn hard_delete<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::TABLE);
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // Limpa o tombstone enquanto a linha ainda existe fisicamente.
    // Restaurar algo já vivo não é erro.
    pub async fn restore<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "UPDATE {} SET deleted_at = NULL, updated_at = now() WHERE id = $1",
            T::TABLE
        );
        let result = sqlx::query(&sql).bind(id).execute(executor).await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound);
        }
        Ok(())
    }

    // Visão padrão: somente linhas vivas, já filtradas pelo escopo.
    pub async fn list_live(&self, scope: &TenantScope) -> Result<Vec<T>, AppError> {
        self.list(scope, true).await
    }

    // Visão de auditoria: inclui tombstones. Reservada a telas de
    // administração; nunca alimenta listagem de negócio.
    pub async fn list_all(&self, scope: &TenantScope) -> Result<Vec<T>, AppError> {
        self.list(scope, false).await
    }

    async fn list(&self, scope: &TenantScope, only_live: bool) -> Result<Vec<T>, AppError> {
        let Some((sql, org)) = list_sql(T::TABLE, T::ORG, scope.visibility(), only_live) else {
            return Ok(Vec::new());
        };

        let mut query = sqlx::query_as::<_, T>(&sql);
        if let Some(org_id) = org {
            query = query.bind(org_id);
        }
        Ok(query.fetch_all(&self.pool).await?)
    }

    // Busca escopada de uma linha viva. É o re-fetch usado por toda
    // mutação: linha invisível sob o escopo responde como inexistente.
    pub async fn find_live<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<Option<T>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let Some((sql, org)) = find_sql(T::TABLE, T::ORG, scope.visibility()) else {
            return Ok(None);
        };

        let mut query = sqlx::query_as::<_, T>(&sql).bind(id);
        if let Some(org_id) = org {
            query = query.bind(org_id);
        }
        Ok(query.fetch_optional(executor).await?)
    }

    // Existência sob o escopo, enxergando também tombstones. É o re-fetch
    // de restore/hard_delete, que operam sobre linhas já excluídas
    // logicamente.
    pub async fn exists_scoped<'e, E>(
        &self,
        executor: E,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let org_bind = match scope.visibility() {
            Visibility::All => None,
            Visibility::Organization(org_id) => Some(org_id),
            Visibility::Nothing => return Ok(false),
        };

        let sql = match org_bind {
            Some(_) => format!(
                "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND {})",
                T::TABLE,
                T::ORG.clause(2)
            ),
            None => format!("SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1)", T::TABLE),
        };

        let mut query = sqlx::query_scalar::<_, bool>(&sql).bind(id);
        if let Some(org_id) = org_bind {
            query = query.bind(org_id);
        }
        Ok(query.fetch_one(executor).await?)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// Monta o SELECT da listagem. None = visibilidade nula (resposta vazia
// sem tocar o banco). O Uuid retornado é o bind do filtro de organização.
fn list_sql(
    table: &str,
    org: OrgRelation,
    visibility: Visibility,
    only_live: bool,
) -> Option<(String, Option<Uuid>)> {
    let mut clauses: Vec<String> = Vec::new();
    if only_live {
        clauses.push("deleted_at IS NULL".to_string());
    }

    let org_bind = match visibility {
        Visibility::All => None,
        Visibility::Organization(id) => {
            clauses.push(org.clause(1));
            Some(id)
        }
        Visibility::Nothing => return None,
    };

    let where_sql = if clauses.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", clauses.join(" AND "))
    };

    Some((
        format!("SELECT * FROM {table}{where_sql} ORDER BY created_at DESC"),
        org_bind,
    ))
}

fn find_sql(
    table: &str,
    org: OrgRelation,
    visibility: Visibility,
) -> Option<(String, Option<Uuid>)> {
    let mut clauses = vec!["id = $1".to_string(), "deleted_at IS NULL".to_string()];

    let org_bind = match visibility {
        Visibility::All => None,
        Visibility::Organization(id) => {
            clauses.push(org.clause(2));
            Some(id)
        }
        Visibility::Nothing => return None,
    };

    Some((format!("SELECT * FROM {table} WHERE {}", clauses.join(" AND ")), org_bind))
}

// ---
// Mapeamento tabela/relação por entidade
// ---

impl LifecycleModel for Organization {
    const TABLE: &'static str = "organizations";
    const ORG: OrgRelation = OrgRelation::SelfId;
}

impl LifecycleModel for Category {
    const TABLE: &'static str = "categories";
    const ORG: OrgRelation = OrgRelation::Direct;
}

impl LifecycleModel for Zone {
    const TABLE: &'static str = "zones";
    const ORG: OrgRelation = OrgRelation::Direct;
}

impl LifecycleModel for Device {
    const TABLE: &'static str = "devices";
    const ORG: OrgRelation = OrgRelation::Direct;
}

impl LifecycleModel for Sensor {
    const TABLE: &'static str = "sensors";
    const ORG: OrgRelation = OrgRelation::ViaDevice;
}

impl LifecycleModel for Measurement {
    const TABLE: &'static str = "measurements";
    const ORG: OrgRelation = OrgRelation::ViaDevice;
}

impl LifecycleModel for Alert {
    const TABLE: &'static str = "alerts";
    const ORG: OrgRelation = OrgRelation::ViaDevice;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_sql_filters_live_and_organization() {
        let org = Uuid::new_v4();
        let (sql, bind) =
            list_sql("devices", OrgRelation::Direct, Visibility::Organization(org), true).unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM devices WHERE deleted_at IS NULL AND organization_id = $1 \
             ORDER BY created_at DESC"
        );
        assert_eq!(bind, Some(org));
    }

    #[test]
    fn list_sql_for_superuser_has_no_org_clause() {
        let (sql, bind) = list_sql("devices", OrgRelation::Direct, Visibility::All, true).unwrap();
        assert!(!sql.contains("organization_id"));
        assert_eq!(bind, None);
    }

    #[test]
    fn list_all_keeps_tombstones_visible() {
        let (sql, _) = list_sql("devices", OrgRelation::Direct, Visibility::All, false).unwrap();
        assert!(!sql.contains("deleted_at"));
    }

    #[test]
    fn nothing_visibility_never_reaches_the_database() {
        assert!(list_sql("devices", OrgRelation::Direct, Visibility::Nothing, true).is_none());
        assert!(find_sql("devices", OrgRelation::Direct, Visibility::Nothing).is_none());
    }

    #[test]
    fn find_sql_traverses_device_for_child_entities() {
        let org = Uuid::new_v4();
        let (sql, bind) =
            find_sql("measurements", OrgRelation::ViaDevice, Visibility::Organization(org))
                .unwrap();
        assert!(sql.contains("device_id IN (SELECT id FROM devices WHERE organization_id = $2)"));
        assert_eq!(bind, Some(org));
    }
}

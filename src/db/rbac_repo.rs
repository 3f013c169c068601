// src/db/rbac_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, conflict_on_unique};
use crate::models::rbac::{Group, MatrixEntry, Module, PermissionFlags, Role, RoleModulePermission};

#[derive(Clone)]
pub struct RbacRepository {
    pool: PgPool,
}

impl RbacRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // As linhas da matriz que alcançam o usuário para um módulo:
    // usuário -> grupos -> cargos -> permissões do módulo.
    // A agregação aditiva acontece em PermissionFlags::merge.
    pub async fn permission_flags_for(
        &self,
        user_id: Uuid,
        module_code: &str,
    ) -> Result<Vec<PermissionFlags>, AppError> {
        let rows = sqlx::query_as::<_, PermissionFlags>(
            r#"
            SELECT rmp.can_view, rmp.can_add, rmp.can_change, rmp.can_delete
            FROM user_groups ug
            JOIN roles r ON r.group_id = ug.group_id AND r.deleted_at IS NULL
            JOIN role_module_permissions rmp ON rmp.role_id = r.id AND rmp.deleted_at IS NULL
            JOIN modules m ON m.id = rmp.module_id AND m.deleted_at IS NULL
            WHERE ug.user_id = $1 AND m.code = $2
            "#,
        )
        .bind(user_id)
        .bind(module_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    pub async fn find_module_by_code(&self, code: &str) -> Result<Option<Module>, AppError> {
        let module = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE code = $1 AND deleted_at IS NULL",
        )
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;
        Ok(module)
    }

    pub async fn create_module<'e, E>(
        &self,
        executor: E,
        code: &str,
        name: &str,
        icon: &str,
    ) -> Result<Module, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Module>(
            "INSERT INTO modules (code, name, icon) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(code)
        .bind(name)
        .bind(icon)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Já existe um módulo com esse código."))
    }

    // get-or-create, como o script de semente original.
    pub async fn get_or_create_module<'e, E>(
        &self,
        executor: E,
        code: &str,
        name: &str,
    ) -> Result<Module, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let module = sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (code, name)
            VALUES ($1, $2)
            ON CONFLICT (code) DO UPDATE SET code = EXCLUDED.code
            RETURNING *
            "#,
        )
        .bind(code)
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(module)
    }

    pub async fn get_or_create_group<'e, E>(
        &self,
        executor: E,
        name: &str,
    ) -> Result<Group, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let group = sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO groups (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING *
            "#,
        )
        .bind(name)
        .fetch_one(executor)
        .await?;
        Ok(group)
    }

    pub async fn get_or_create_role<'e, E>(
        &self,
        executor: E,
        group_id: Uuid,
    ) -> Result<Role, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let role = sqlx::query_as::<_, Role>(
            r#"
            INSERT INTO roles (group_id)
            VALUES ($1)
            ON CONFLICT (group_id) DO UPDATE SET group_id = EXCLUDED.group_id
            RETURNING *
            "#,
        )
        .bind(group_id)
        .fetch_one(executor)
        .await?;
        Ok(role)
    }

    pub async fn find_role_by_group_name(&self, name: &str) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            r#"
            SELECT r.* FROM roles r
            JOIN groups g ON g.id = r.group_id
            WHERE g.name = $1 AND r.deleted_at IS NULL
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    // Inserção estrita: par (cargo, módulo) duplicado é Conflict.
    pub async fn create_permission<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        module_id: Uuid,
        flags: PermissionFlags,
    ) -> Result<RoleModulePermission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoleModulePermission>(
            r#"
            INSERT INTO role_module_permissions
                (role_id, module_id, can_view, can_add, can_change, can_delete)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(module_id)
        .bind(flags.can_view)
        .bind(flags.can_add)
        .bind(flags.can_change)
        .bind(flags.can_delete)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Já existe permissão para esse par (cargo, módulo)."))
    }

    // Semente idempotente: não sobrescreve uma linha existente.
    pub async fn seed_permission<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        module_id: Uuid,
        flags: PermissionFlags,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO role_module_permissions
                (role_id, module_id, can_view, can_add, can_change, can_delete)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (role_id, module_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(module_id)
        .bind(flags.can_view)
        .bind(flags.can_add)
        .bind(flags.can_change)
        .bind(flags.can_delete)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn update_permission<'e, E>(
        &self,
        executor: E,
        role_id: Uuid,
        module_id: Uuid,
        flags: PermissionFlags,
    ) -> Result<RoleModulePermission, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, RoleModulePermission>(
            r#"
            UPDATE role_module_permissions
            SET can_view = $3, can_add = $4, can_change = $5, can_delete = $6,
                updated_at = now()
            WHERE role_id = $1 AND module_id = $2 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(role_id)
        .bind(module_id)
        .bind(flags.can_view)
        .bind(flags.can_add)
        .bind(flags.can_change)
        .bind(flags.can_delete)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::NotFound)
    }

    pub async fn add_user_to_group<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        group_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO user_groups (user_id, group_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(group_id)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        let modules = sqlx::query_as::<_, Module>(
            "SELECT * FROM modules WHERE deleted_at IS NULL ORDER BY code",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(modules)
    }

    // Visão achatada da matriz para a tela de administração.
    pub async fn list_matrix(&self) -> Result<Vec<MatrixEntry>, AppError> {
        let entries = sqlx::query_as::<_, MatrixEntry>(
            r#"
            SELECT r.id AS role_id, g.name AS group_name, m.code AS module_code,
                   rmp.can_view, rmp.can_add, rmp.can_change, rmp.can_delete
            FROM role_module_permissions rmp
            JOIN roles r ON r.id = rmp.role_id AND r.deleted_at IS NULL
            JOIN groups g ON g.id = r.group_id
            JOIN modules m ON m.id = rmp.module_id AND m.deleted_at IS NULL
            WHERE rmp.deleted_at IS NULL
            ORDER BY g.name, m.code
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}

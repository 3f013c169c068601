// src/db/tenancy_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, conflict_on_unique};
use crate::models::tenancy::{Organization, UserProfile};

#[derive(Clone)]
pub struct TenancyRepository {
    pool: PgPool,
}

impl TenancyRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // A resolução de organização do usuário, em passos explícitos:
    // sem perfil -> None; organização tombstonada -> None. Falha de banco
    // propaga como erro, nunca é mascarada como "sem organização".
    pub async fn resolve_organization(
        &self,
        user_id: Uuid,
    ) -> Result<Option<Organization>, AppError> {
        let organization = sqlx::query_as::<_, Organization>(
            r#"
            SELECT o.* FROM organizations o
            JOIN user_profiles p ON p.organization_id = o.id
            WHERE p.user_id = $1
              AND p.deleted_at IS NULL
              AND o.deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(organization)
    }

    pub async fn create_organization<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            "INSERT INTO organizations (name, email) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Já existe uma organização com esse e-mail."))
    }

    pub async fn update_organization<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: Option<&str>,
        email: Option<&str>,
        status: Option<crate::models::lifecycle::EntityStatus>,
    ) -> Result<Organization, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Organization>(
            r#"
            UPDATE organizations
            SET name = COALESCE($2, name),
                email = COALESCE($3, email),
                status = COALESCE($4, status),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Já existe uma organização com esse e-mail."))
    }

    pub async fn find_profile_by_user(
        &self,
        user_id: Uuid,
    ) -> Result<Option<UserProfile>, AppError> {
        let profile = sqlx::query_as::<_, UserProfile>(
            "SELECT * FROM user_profiles WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(profile)
    }

    pub async fn create_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        organization_id: Uuid,
    ) -> Result<UserProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserProfile>(
            "INSERT INTO user_profiles (user_id, organization_id) VALUES ($1, $2) RETURNING *",
        )
        .bind(user_id)
        .bind(organization_id)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Este usuário já possui perfil."))
    }

    pub async fn update_profile<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        rut: Option<&str>,
        telefono: Option<&str>,
        direccion: Option<&str>,
        profile_image: Option<&str>,
    ) -> Result<UserProfile, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE user_profiles
            SET rut = COALESCE($2, rut),
                telefono = COALESCE($3, telefono),
                direccion = COALESCE($4, direccion),
                profile_image = COALESCE($5, profile_image),
                updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(rut)
        .bind(telefono)
        .bind(direccion)
        .bind(profile_image)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Este RUT já está em uso."))
    }
}

// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::{AppError, conflict_on_unique};
use crate::db::scope::{TenantScope, Visibility};
use crate::models::auth::User;

// O repositório de usuários, responsável pelas interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING *",
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Este e-mail já está em uso."))
    }

    // Atualização parcial dos dados cadastrais (COALESCE mantém o valor atual).
    pub async fn update_identity<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        first_name: Option<&str>,
        last_name: Option<&str>,
        email: Option<&str>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(first_name)
        .bind(last_name)
        .bind(email)
        .fetch_one(executor)
        .await
        .map_err(|e| conflict_on_unique(e, "Este e-mail já está em uso."))
    }

    pub async fn update_password<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(executor)
            .await?;
        Ok(())
    }

    // Usuários visíveis sob o escopo: os que têm perfil na organização.
    pub async fn list_scoped(&self, scope: &TenantScope) -> Result<Vec<User>, AppError> {
        match scope.visibility() {
            Visibility::All => {
                let users =
                    sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
                        .fetch_all(&self.pool)
                        .await?;
                Ok(users)
            }
            Visibility::Organization(org_id) => {
                let users = sqlx::query_as::<_, User>(
                    r#"
                    SELECT u.* FROM users u
                    JOIN user_profiles p ON p.user_id = u.id
                    WHERE p.organization_id = $1 AND p.deleted_at IS NULL
                    ORDER BY u.created_at DESC
                    "#,
                )
                .bind(org_id)
                .fetch_all(&self.pool)
                .await?;
                Ok(users)
            }
            Visibility::Nothing => Ok(Vec::new()),
        }
    }
}

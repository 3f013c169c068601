// src/services/tenancy_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LifecycleManager, TenancyRepository, TenantScope, UserRepository},
    models::auth::User,
    models::tenancy::{Organization, UpdateOrganizationPayload, UpdateProfilePayload, UserProfile},
};

#[derive(Clone)]
pub struct TenancyService {
    tenancy_repo: TenancyRepository,
    user_repo: UserRepository,
    organizations: LifecycleManager<Organization>,
    pool: PgPool,
}

impl TenancyService {
    pub fn new(
        tenancy_repo: TenancyRepository,
        user_repo: UserRepository,
        pool: PgPool,
    ) -> Self {
        let organizations = LifecycleManager::new(pool.clone());
        Self { tenancy_repo, user_repo, organizations, pool }
    }

    // A resolução explícita: Some(org) quando o perfil existe e aponta para
    // uma organização viva; None caso contrário. Erro de banco propaga.
    pub async fn resolve_organization(
        &self,
        user: &User,
    ) -> Result<Option<Organization>, AppError> {
        self.tenancy_repo.resolve_organization(user.id).await
    }

    // O escopo que todas as consultas e mutações de negócio recebem.
    // Sem organização e sem superusuário, o escopo nega tudo (falha fechada).
    pub async fn scope_for(&self, user: &User) -> Result<TenantScope, AppError> {
        let organization = self.resolve_organization(user).await?;
        Ok(TenantScope::for_user(user.is_superuser, organization.map(|o| o.id)))
    }

    pub async fn my_organization(&self, user: &User) -> Result<Organization, AppError> {
        self.resolve_organization(user).await?.ok_or(AppError::NotFound)
    }

    pub async fn my_profile(&self, user: &User) -> Result<UserProfile, AppError> {
        self.tenancy_repo.find_profile_by_user(user.id).await?.ok_or(AppError::NotFound)
    }

    // Edição de perfil: dados do usuário e do perfil mudam juntos.
    pub async fn update_profile(
        &self,
        user: &User,
        payload: &UpdateProfilePayload,
    ) -> Result<UserProfile, AppError> {
        // O perfil precisa existir antes de abrir a transação.
        self.tenancy_repo.find_profile_by_user(user.id).await?.ok_or(AppError::NotFound)?;

        let mut tx = self.pool.begin().await?;

        self.user_repo
            .update_identity(
                &mut *tx,
                user.id,
                payload.first_name.as_deref(),
                payload.last_name.as_deref(),
                payload.email.as_deref(),
            )
            .await?;

        let profile = self
            .tenancy_repo
            .update_profile(
                &mut *tx,
                user.id,
                payload.rut.as_deref(),
                payload.telefono.as_deref(),
                payload.direccion.as_deref(),
                payload.profile_image.as_deref(),
            )
            .await?;

        tx.commit().await?;
        Ok(profile)
    }

    pub async fn list_users(&self, scope: &TenantScope) -> Result<Vec<User>, AppError> {
        self.user_repo.list_scoped(scope).await
    }

    // ---
    // Administração de organizações
    // ---

    pub async fn list_organizations(
        &self,
        scope: &TenantScope,
    ) -> Result<Vec<Organization>, AppError> {
        self.organizations.list_live(scope).await
    }

    // Visão de auditoria (inclui tombstones); reservada a superusuários.
    pub async fn list_organizations_all(
        &self,
        user: &User,
        scope: &TenantScope,
    ) -> Result<Vec<Organization>, AppError> {
        if !user.is_superuser {
            return Err(AppError::PermissionDenied);
        }
        self.organizations.list_all(scope).await
    }

    pub async fn update_organization(
        &self,
        scope: &TenantScope,
        id: Uuid,
        payload: &UpdateOrganizationPayload,
    ) -> Result<Organization, AppError> {
        let mut tx = self.pool.begin().await?;

        // Re-fetch sob o escopo: invisível responde como inexistente.
        self.organizations
            .find_live(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound)?;

        let organization = self
            .tenancy_repo
            .update_organization(
                &mut *tx,
                id,
                payload.name.as_deref(),
                payload.email.as_deref(),
                payload.status,
            )
            .await?;

        tx.commit().await?;
        Ok(organization)
    }

    pub async fn delete_organization(
        &self,
        scope: &TenantScope,
        id: Uuid,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        self.organizations
            .find_live(&mut *tx, scope, id)
            .await?
            .ok_or(AppError::NotFound)?;
        self.organizations.soft_delete(&mut *tx, id).await?;
        tx.commit().await?;
        Ok(())
    }

    // Restauração e exclusão física são manutenção privilegiada.
    pub async fn restore_organization(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        if !user.is_superuser {
            return Err(AppError::PermissionDenied);
        }
        self.organizations.restore(self.organizations.pool(), id).await
    }

    pub async fn hard_delete_organization(&self, user: &User, id: Uuid) -> Result<(), AppError> {
        if !user.is_superuser {
            return Err(AppError::PermissionDenied);
        }
        self.organizations.hard_delete(self.organizations.pool(), id).await
    }
}

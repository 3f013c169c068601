// src/services/rbac_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RbacRepository,
    models::auth::User,
    models::rbac::{
        MatrixEntry, Module, PermissionAction, PermissionFlags, Role, RoleModulePermission,
    },
};

pub const MODULE_DISPOSITIVOS: &str = "dispositivos";
pub const MODULE_USUARIOS: &str = "usuarios";

#[derive(Clone)]
pub struct RbacService {
    repo: RbacRepository,
    pool: PgPool,
}

impl RbacService {
    pub fn new(repo: RbacRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // A única fonte de autorização do sistema. Resolução:
    // (a) superusuário: tudo; (b) une as linhas da matriz alcançadas pelos
    // grupos do usuário; (c) sem linha para o par (cargo, módulo), nega.
    pub async fn authorize(
        &self,
        user: &User,
        module_code: &str,
        action: PermissionAction,
    ) -> Result<bool, AppError> {
        if user.is_superuser {
            return Ok(true);
        }

        let rows = self.repo.permission_flags_for(user.id, module_code).await?;
        Ok(PermissionFlags::merge(rows).allows(action))
    }

    // Versão que barra a entrada: os pontos de mutação chamam isto antes
    // de chegar à camada de escopo.
    pub async fn require(
        &self,
        user: &User,
        module_code: &str,
        action: PermissionAction,
    ) -> Result<(), AppError> {
        if self.authorize(user, module_code, action).await? {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }

    // ---
    // Administração da matriz
    // ---

    pub async fn create_module(
        &self,
        code: &str,
        name: &str,
        icon: &str,
    ) -> Result<Module, AppError> {
        self.repo.create_module(&self.pool, code, name, icon).await
    }

    pub async fn list_modules(&self) -> Result<Vec<Module>, AppError> {
        self.repo.list_modules().await
    }

    // Cria (ou reaproveita) o grupo e o cargo que o envolve.
    pub async fn create_role(&self, group_name: &str) -> Result<Role, AppError> {
        let mut tx = self.pool.begin().await?;
        let group = self.repo.get_or_create_group(&mut *tx, group_name).await?;
        let role = self.repo.get_or_create_role(&mut *tx, group.id).await?;
        tx.commit().await?;
        Ok(role)
    }

    // Linha nova da matriz; par duplicado responde Conflict.
    pub async fn create_permission(
        &self,
        role_id: Uuid,
        module_code: &str,
        flags: PermissionFlags,
    ) -> Result<RoleModulePermission, AppError> {
        let module =
            self.repo.find_module_by_code(module_code).await?.ok_or(AppError::NotFound)?;
        self.repo.create_permission(&self.pool, role_id, module.id, flags).await
    }

    pub async fn update_permission(
        &self,
        role_id: Uuid,
        module_code: &str,
        flags: PermissionFlags,
    ) -> Result<RoleModulePermission, AppError> {
        let module =
            self.repo.find_module_by_code(module_code).await?.ok_or(AppError::NotFound)?;
        self.repo.update_permission(&self.pool, role_id, module.id, flags).await
    }

    pub async fn list_matrix(&self) -> Result<Vec<MatrixEntry>, AppError> {
        self.repo.list_matrix().await
    }

    pub async fn assign_user_to_group(
        &self,
        user_id: Uuid,
        group_name: &str,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        let group = self.repo.get_or_create_group(&mut *tx, group_name).await?;
        self.repo.add_user_to_group(&mut *tx, user_id, group.id).await?;
        tx.commit().await?;
        Ok(())
    }

    // ---
    // Semente
    // ---
    // Os três cargos de linha de base. São dados iniciais, não política em
    // código: linhas novas entram pela administração da matriz.
    // Idempotente: linhas existentes não são sobrescritas.
    pub async fn seed_baseline(&self) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        let dispositivos = self
            .repo
            .get_or_create_module(&mut *tx, MODULE_DISPOSITIVOS, "Dispositivos")
            .await?;
        let usuarios =
            self.repo.get_or_create_module(&mut *tx, MODULE_USUARIOS, "Usuarios").await?;

        let admin_group = self.repo.get_or_create_group(&mut *tx, "Admin").await?;
        let admin_role = self.repo.get_or_create_role(&mut *tx, admin_group.id).await?;

        let manager_group = self.repo.get_or_create_group(&mut *tx, "Manager").await?;
        let manager_role = self.repo.get_or_create_role(&mut *tx, manager_group.id).await?;

        let user_group = self.repo.get_or_create_group(&mut *tx, "User").await?;
        let user_role = self.repo.get_or_create_role(&mut *tx, user_group.id).await?;

        // Admin: todas as ações nos dois módulos.
        self.repo
            .seed_permission(&mut *tx, admin_role.id, dispositivos.id, PermissionFlags::all())
            .await?;
        self.repo
            .seed_permission(&mut *tx, admin_role.id, usuarios.id, PermissionFlags::all())
            .await?;

        // Manager: view/add/change em dispositivos; somente view em usuarios.
        self.repo
            .seed_permission(
                &mut *tx,
                manager_role.id,
                dispositivos.id,
                PermissionFlags { can_view: true, can_add: true, can_change: true, can_delete: false },
            )
            .await?;
        self.repo
            .seed_permission(
                &mut *tx,
                manager_role.id,
                usuarios.id,
                PermissionFlags { can_view: true, ..Default::default() },
            )
            .await?;

        // User: somente view em dispositivos; nada em usuarios.
        self.repo
            .seed_permission(
                &mut *tx,
                user_role.id,
                dispositivos.id,
                PermissionFlags { can_view: true, ..Default::default() },
            )
            .await?;
        self.repo
            .seed_permission(&mut *tx, user_role.id, usuarios.id, PermissionFlags::default())
            .await?;

        tx.commit().await?;
        Ok(())
    }
}

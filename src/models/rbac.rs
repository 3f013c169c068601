// src/models/rbac.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lifecycle::EntityStatus;

// Uma área funcional do sistema, identificada por um slug único.
// A matriz de permissões é granulada por módulo, não por entidade.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,

    #[schema(example = "dispositivos")]
    pub code: String,

    #[schema(example = "Dispositivos")]
    pub name: String,

    pub icon: String,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Grupo de autorização ao qual os usuários são vinculados.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,

    #[schema(example = "Manager")]
    pub name: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Um cargo é um invólucro 1:1 sobre um grupo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: Uuid,
    pub group_id: Uuid,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Linha da matriz (cargo x módulo) com os quatro flags independentes.
// Única por par (role, module); a ausência da linha nega tudo.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RoleModulePermission {
    pub id: Uuid,
    pub role_id: Uuid,
    pub module_id: Uuid,
    pub can_view: bool,
    pub can_add: bool,
    pub can_change: bool,
    pub can_delete: bool,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// As quatro ações que a matriz conhece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PermissionAction {
    View,
    Add,
    Change,
    Delete,
}

// Flags agregados de um usuário sobre um módulo. As permissões são
// aditivas entre cargos: basta UM cargo conceder a ação.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionFlags {
    pub can_view: bool,
    pub can_add: bool,
    pub can_change: bool,
    pub can_delete: bool,
}

impl PermissionFlags {
    pub fn all() -> Self {
        Self { can_view: true, can_add: true, can_change: true, can_delete: true }
    }

    pub fn allows(&self, action: PermissionAction) -> bool {
        match action {
            PermissionAction::View => self.can_view,
            PermissionAction::Add => self.can_add,
            PermissionAction::Change => self.can_change,
            PermissionAction::Delete => self.can_delete,
        }
    }

    // União aditiva das linhas encontradas para os cargos do usuário.
    // Sem linhas, o Default (tudo false) materializa a negação por omissão.
    pub fn merge<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = PermissionFlags>,
    {
        rows.into_iter().fold(Self::default(), |acc, row| Self {
            can_view: acc.can_view || row.can_view,
            can_add: acc.can_add || row.can_add,
            can_change: acc.can_change || row.can_change,
            can_delete: acc.can_delete || row.can_delete,
        })
    }
}

// ---
// Payloads de administração da matriz
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateModulePayload {
    #[validate(length(min = 1, max = 50, message = "O código deve ter entre 1 e 50 caracteres."))]
    pub code: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRolePayload {
    #[validate(length(min = 1, message = "O nome do grupo é obrigatório."))]
    pub group_name: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPermissionPayload {
    pub role_id: Uuid,

    #[schema(example = "dispositivos")]
    pub module_code: String,

    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_add: bool,
    #[serde(default)]
    pub can_change: bool,
    #[serde(default)]
    pub can_delete: bool,
}

// Visão achatada da matriz para as telas de administração.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrixEntry {
    pub role_id: Uuid,
    pub group_name: String,
    pub module_code: String,
    pub can_view: bool,
    pub can_add: bool,
    pub can_change: bool,
    pub can_delete: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_of_nothing_denies_everything() {
        let flags = PermissionFlags::merge(std::iter::empty());
        assert!(!flags.allows(PermissionAction::View));
        assert!(!flags.allows(PermissionAction::Add));
        assert!(!flags.allows(PermissionAction::Change));
        assert!(!flags.allows(PermissionAction::Delete));
    }

    #[test]
    fn merge_is_additive_across_roles() {
        // Um cargo só com view, outro só com add: o usuário recebe ambos.
        let view_only = PermissionFlags { can_view: true, ..Default::default() };
        let add_only = PermissionFlags { can_add: true, ..Default::default() };

        let flags = PermissionFlags::merge([view_only, add_only]);
        assert!(flags.allows(PermissionAction::View));
        assert!(flags.allows(PermissionAction::Add));
        assert!(!flags.allows(PermissionAction::Change));
        assert!(!flags.allows(PermissionAction::Delete));
    }

    #[test]
    fn explicit_false_rows_do_not_grant() {
        let nothing = PermissionFlags::default();
        let flags = PermissionFlags::merge([nothing, nothing]);
        assert_eq!(flags, PermissionFlags::default());
    }
}

// src/db/scope.rs

use uuid::Uuid;

use crate::common::error::AppError;

// O escopo do usuário autenticado, derivado de forma explícita:
// existe perfil? o perfil aponta para uma organização viva?
// Nunca um "engole-tudo" que mascare falha de banco como "sem organização".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TenantScope {
    pub is_superuser: bool,
    pub organization_id: Option<Uuid>,
}

// O que o escopo deixa enxergar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    // Superusuário: sem filtro de organização.
    All,
    // Usuário comum com organização resolvida.
    Organization(Uuid),
    // Sem organização resolvível: falha FECHADA (nenhuma linha, nunca erro).
    Nothing,
}

impl TenantScope {
    pub fn for_user(is_superuser: bool, organization_id: Option<Uuid>) -> Self {
        Self { is_superuser, organization_id }
    }

    pub fn visibility(&self) -> Visibility {
        if self.is_superuser {
            return Visibility::All;
        }
        match self.organization_id {
            Some(id) => Visibility::Organization(id),
            None => Visibility::Nothing,
        }
    }

    // Organização a carimbar em criações. O valor vindo do cliente é
    // sempre ignorado; sem organização resolvida não há criação.
    pub fn stamp_organization(&self) -> Result<Uuid, AppError> {
        self.organization_id.ok_or_else(|| {
            let mut errors = validator::ValidationErrors::new();
            let mut err = validator::ValidationError::new("organization");
            err.message = Some("O usuário autenticado não possui organização.".into());
            errors.add("organization", err);
            AppError::ValidationError(errors)
        })
    }
}

// Como uma tabela chega à organização dona.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrgRelation {
    // A própria tabela de organizações: o filtro é sobre o id.
    SelfId,
    // Coluna organization_id na própria tabela.
    Direct,
    // Entidades filhas de dispositivo (sensores, medições, alertas):
    // o filtro atravessa o dispositivo dono.
    ViaDevice,
}

impl OrgRelation {
    // Cláusula SQL do filtro de organização, com o placeholder indicado.
    pub fn clause(&self, bind_index: usize) -> String {
        match self {
            OrgRelation::SelfId => format!("id = ${bind_index}"),
            OrgRelation::Direct => format!("organization_id = ${bind_index}"),
            OrgRelation::ViaDevice => format!(
                "device_id IN (SELECT id FROM devices WHERE organization_id = ${bind_index})"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn superuser_sees_everything() {
        let scope = TenantScope::for_user(true, None);
        assert_eq!(scope.visibility(), Visibility::All);
    }

    #[test]
    fn user_with_organization_is_scoped() {
        let org = Uuid::new_v4();
        let scope = TenantScope::for_user(false, Some(org));
        assert_eq!(scope.visibility(), Visibility::Organization(org));
    }

    #[test]
    fn user_without_organization_sees_nothing() {
        // Falha fechada: perfil ausente não vira acesso global.
        let scope = TenantScope::for_user(false, None);
        assert_eq!(scope.visibility(), Visibility::Nothing);
    }

    #[test]
    fn stamp_requires_resolved_organization() {
        let org = Uuid::new_v4();
        assert_eq!(TenantScope::for_user(false, Some(org)).stamp_organization().unwrap(), org);
        assert!(TenantScope::for_user(true, None).stamp_organization().is_err());
    }

    #[test]
    fn clauses_traverse_the_right_relation() {
        assert_eq!(OrgRelation::Direct.clause(2), "organization_id = $2");
        assert_eq!(OrgRelation::SelfId.clause(1), "id = $1");
        assert!(OrgRelation::ViaDevice.clause(2).contains("FROM devices"));
    }
}

// src/middleware/rbac.rs
//
// O guardião de permissões. Os decorators de view do sistema original
// viram extratores finos sobre a matriz (cargo x módulo): o handler
// declara o par módulo/ação no tipo e a checagem acontece antes dele.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::User,
    models::rbac::PermissionAction,
};

/// 1. O Trait que define o que é uma Permissão
pub trait PermissionDef: Send + Sync + 'static {
    fn module() -> &'static str;
    fn action() -> PermissionAction;
}

/// 2. O Extractor (Guardião)
pub struct RequirePermission<T>(pub PhantomData<T>);

// 3. Implementação do FromRequestParts

impl<T, S> FromRequestParts<S> for RequirePermission<T>
where
    T: PermissionDef,
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        // A. Extrai o usuário autenticado (inserido pelo auth_guard)
        let user = parts.extensions.get::<User>().ok_or(AppError::InvalidToken)?;

        // B. Consulta a matriz; negado responde 403 sem revelar mais nada
        app_state
            .rbac_service
            .require(user, T::module(), T::action())
            .await?;

        Ok(RequirePermission(PhantomData))
    }
}

// ---
// DEFINIÇÃO DAS PERMISSÕES (TIPOS)
// ---

use crate::services::rbac_service::{MODULE_DISPOSITIVOS, MODULE_USUARIOS};

pub struct PermDispositivosView;
impl PermissionDef for PermDispositivosView {
    fn module() -> &'static str { MODULE_DISPOSITIVOS }
    fn action() -> PermissionAction { PermissionAction::View }
}

pub struct PermDispositivosAdd;
impl PermissionDef for PermDispositivosAdd {
    fn module() -> &'static str { MODULE_DISPOSITIVOS }
    fn action() -> PermissionAction { PermissionAction::Add }
}

pub struct PermDispositivosChange;
impl PermissionDef for PermDispositivosChange {
    fn module() -> &'static str { MODULE_DISPOSITIVOS }
    fn action() -> PermissionAction { PermissionAction::Change }
}

pub struct PermDispositivosDelete;
impl PermissionDef for PermDispositivosDelete {
    fn module() -> &'static str { MODULE_DISPOSITIVOS }
    fn action() -> PermissionAction { PermissionAction::Delete }
}

pub struct PermUsuariosView;
impl PermissionDef for PermUsuariosView {
    fn module() -> &'static str { MODULE_USUARIOS }
    fn action() -> PermissionAction { PermissionAction::View }
}

pub struct PermUsuariosAdd;
impl PermissionDef for PermUsuariosAdd {
    fn module() -> &'static str { MODULE_USUARIOS }
    fn action() -> PermissionAction { PermissionAction::Add }
}

pub struct PermUsuariosChange;
impl PermissionDef for PermUsuariosChange {
    fn module() -> &'static str { MODULE_USUARIOS }
    fn action() -> PermissionAction { PermissionAction::Change }
}

pub struct PermUsuariosDelete;
impl PermissionDef for PermUsuariosDelete {
    fn module() -> &'static str { MODULE_USUARIOS }
    fn action() -> PermissionAction { PermissionAction::Delete }
}

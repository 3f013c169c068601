//! Utilidades compartilhadas pelos testes de integração.
//!
//! Cada teste recebe um banco isolado do harness do sqlx, com as
//! migrações aplicadas; aqui ficam as fixtures de usuários, organizações
//! e dispositivos.

#![allow(dead_code)]

use sqlx::PgPool;
use uuid::Uuid;

use monitoreo::config::AppState;
use monitoreo::db::{TenantScope, UserRepository};
use monitoreo::models::auth::User;
use monitoreo::models::devices::{
    Category, CreateCategoryPayload, CreateDevicePayload, CreateZonePayload, Device, Zone,
};

pub const TEST_JWT_SECRET: &str = "segredo-de-teste";

pub fn app_state(pool: PgPool) -> AppState {
    AppState::from_pool(pool, TEST_JWT_SECRET.to_string())
}

// Registra usuário + organização + perfil e devolve o usuário persistido.
pub async fn register_user(
    state: &AppState,
    email: &str,
    org_name: &str,
    org_email: &str,
) -> User {
    state
        .auth_service
        .register_user(email, "Segura123", org_name, org_email)
        .await
        .expect("registro deveria funcionar");

    UserRepository::new(state.db_pool.clone())
        .find_by_email(email)
        .await
        .expect("busca de usuário")
        .expect("usuário recém-registrado existe")
}

// Usuário sem perfil (e portanto sem organização resolvível).
pub async fn create_user_without_profile(state: &AppState, email: &str) -> User {
    UserRepository::new(state.db_pool.clone())
        .create_user(&state.db_pool, email, "hash-irrelevante")
        .await
        .expect("criação de usuário sem perfil")
}

pub async fn make_superuser(pool: &PgPool, user_id: Uuid) {
    sqlx::query("UPDATE users SET is_superuser = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await
        .expect("promoção a superusuário");
}

pub async fn scope_for(state: &AppState, user: &User) -> TenantScope {
    state.tenancy_service.scope_for(user).await.expect("derivação de escopo")
}

// Categoria + zona + dispositivo na organização do escopo dado.
pub async fn create_device_fixture(
    state: &AppState,
    scope: &TenantScope,
    category_name: &str,
    zone_name: &str,
    device_name: &str,
) -> (Category, Zone, Device) {
    let category = state
        .device_service
        .create_category(
            scope,
            &CreateCategoryPayload { name: category_name.to_string(), description: String::new() },
        )
        .await
        .expect("criação de categoria");

    let zone = state
        .device_service
        .create_zone(
            scope,
            &CreateZonePayload { name: zone_name.to_string(), description: String::new() },
        )
        .await
        .expect("criação de zona");

    let device = state
        .device_service
        .create_device(
            scope,
            &CreateDevicePayload {
                name: device_name.to_string(),
                category_id: category.id,
                zone_id: zone.id,
                reference: String::new(),
            },
        )
        .await
        .expect("criação de dispositivo");

    (category, zone, device)
}

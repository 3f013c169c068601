//! Matriz de permissões (cargo x módulo): negação por omissão, soma
//! entre cargos e a semente de linha de base.

mod common;

use common::{app_state, make_superuser, register_user};
use sqlx::PgPool;

use monitoreo::common::error::AppError;
use monitoreo::models::rbac::{PermissionAction, PermissionFlags};
use monitoreo::services::rbac_service::{MODULE_DISPOSITIVOS, MODULE_USUARIOS};

// Par (cargo, módulo) sem linha na matriz nega as quatro ações.
#[sqlx::test(migrations = "./migrations")]
async fn deny_by_default_without_matrix_row(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let user = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    state.rbac_service.create_role("Fantasma").await.unwrap();
    state.rbac_service.assign_user_to_group(user.id, "Fantasma").await.unwrap();

    for action in [
        PermissionAction::View,
        PermissionAction::Add,
        PermissionAction::Change,
        PermissionAction::Delete,
    ] {
        assert!(
            !state.rbac_service.authorize(&user, MODULE_DISPOSITIVOS, action).await.unwrap(),
            "ação {action:?} deveria ser negada sem linha na matriz"
        );
    }
}

// Permissões somam entre cargos: view de um, add de outro.
#[sqlx::test(migrations = "./migrations")]
async fn permissions_are_additive_across_roles(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let user = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;

    let r1 = state.rbac_service.create_role("SoVer").await.unwrap();
    state
        .rbac_service
        .create_permission(
            r1.id,
            MODULE_DISPOSITIVOS,
            PermissionFlags { can_view: true, ..Default::default() },
        )
        .await
        .unwrap();

    let r2 = state.rbac_service.create_role("SoCriar").await.unwrap();
    state
        .rbac_service
        .create_permission(
            r2.id,
            MODULE_DISPOSITIVOS,
            PermissionFlags { can_add: true, ..Default::default() },
        )
        .await
        .unwrap();

    state.rbac_service.assign_user_to_group(user.id, "SoVer").await.unwrap();
    state.rbac_service.assign_user_to_group(user.id, "SoCriar").await.unwrap();

    let svc = &state.rbac_service;
    assert!(svc.authorize(&user, MODULE_DISPOSITIVOS, PermissionAction::View).await.unwrap());
    assert!(svc.authorize(&user, MODULE_DISPOSITIVOS, PermissionAction::Add).await.unwrap());
    assert!(!svc.authorize(&user, MODULE_DISPOSITIVOS, PermissionAction::Change).await.unwrap());
    assert!(!svc.authorize(&user, MODULE_DISPOSITIVOS, PermissionAction::Delete).await.unwrap());
}

// A semente: Manager tem view/add/change em dispositivos, mas NÃO delete;
// em usuarios, somente view.
#[sqlx::test(migrations = "./migrations")]
async fn manager_seed_grants_match_baseline(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let manager = register_user(&state, "manager@test.com", "Org1", "org1@test.com").await;
    state.rbac_service.assign_user_to_group(manager.id, "Manager").await.unwrap();

    let svc = &state.rbac_service;
    assert!(svc.authorize(&manager, MODULE_DISPOSITIVOS, PermissionAction::View).await.unwrap());
    assert!(svc.authorize(&manager, MODULE_DISPOSITIVOS, PermissionAction::Add).await.unwrap());
    assert!(svc.authorize(&manager, MODULE_DISPOSITIVOS, PermissionAction::Change).await.unwrap());
    assert!(!svc.authorize(&manager, MODULE_DISPOSITIVOS, PermissionAction::Delete).await.unwrap());

    assert!(svc.authorize(&manager, MODULE_USUARIOS, PermissionAction::View).await.unwrap());
    assert!(!svc.authorize(&manager, MODULE_USUARIOS, PermissionAction::Add).await.unwrap());
}

// User: somente view em dispositivos; nada em usuarios.
#[sqlx::test(migrations = "./migrations")]
async fn user_seed_is_view_only(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let viewer = register_user(&state, "viewer@test.com", "Org1", "org1@test.com").await;
    state.rbac_service.assign_user_to_group(viewer.id, "User").await.unwrap();

    let svc = &state.rbac_service;
    assert!(svc.authorize(&viewer, MODULE_DISPOSITIVOS, PermissionAction::View).await.unwrap());
    assert!(!svc.authorize(&viewer, MODULE_DISPOSITIVOS, PermissionAction::Add).await.unwrap());
    assert!(!svc.authorize(&viewer, MODULE_USUARIOS, PermissionAction::View).await.unwrap());
}

// Superusuário ignora a matriz.
#[sqlx::test(migrations = "./migrations")]
async fn superuser_short_circuits_the_matrix(pool: PgPool) {
    let state = app_state(pool.clone());
    state.rbac_service.seed_baseline().await.unwrap();

    let root = register_user(&state, "root@test.com", "Org1", "org1@test.com").await;
    make_superuser(&pool, root.id).await;
    let root = monitoreo::db::UserRepository::new(pool.clone())
        .find_by_id(root.id)
        .await
        .unwrap()
        .unwrap();

    assert!(
        state
            .rbac_service
            .authorize(&root, MODULE_USUARIOS, PermissionAction::Delete)
            .await
            .unwrap()
    );
}

// require barra com PermissionDenied (e 403 na borda HTTP).
#[sqlx::test(migrations = "./migrations")]
async fn require_fails_with_permission_denied(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let viewer = register_user(&state, "viewer@test.com", "Org1", "org1@test.com").await;
    state.rbac_service.assign_user_to_group(viewer.id, "User").await.unwrap();

    let err = state
        .rbac_service
        .require(&viewer, MODULE_DISPOSITIVOS, PermissionAction::Delete)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::PermissionDenied));
}

// O par (cargo, módulo) é único: a segunda inserção responde Conflict.
#[sqlx::test(migrations = "./migrations")]
async fn duplicate_role_module_pair_conflicts(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    let role = state.rbac_service.create_role("Duplicado").await.unwrap();
    state
        .rbac_service
        .create_permission(role.id, MODULE_DISPOSITIVOS, PermissionFlags::all())
        .await
        .unwrap();

    let err = state
        .rbac_service
        .create_permission(role.id, MODULE_DISPOSITIVOS, PermissionFlags::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

// A semente é idempotente e não sobrescreve ajustes manuais.
#[sqlx::test(migrations = "./migrations")]
async fn seed_baseline_is_idempotent(pool: PgPool) {
    let state = app_state(pool);
    state.rbac_service.seed_baseline().await.unwrap();

    // Ajuste manual: Manager ganha delete em dispositivos.
    let manager_role = monitoreo::db::RbacRepository::new(state.db_pool.clone())
        .find_role_by_group_name("Manager")
        .await
        .unwrap()
        .unwrap();
    state
        .rbac_service
        .update_permission(manager_role.id, MODULE_DISPOSITIVOS, PermissionFlags::all())
        .await
        .unwrap();

    // Nova semente não desfaz o ajuste.
    state.rbac_service.seed_baseline().await.unwrap();

    let manager = register_user(&state, "manager@test.com", "Org1", "org1@test.com").await;
    state.rbac_service.assign_user_to_group(manager.id, "Manager").await.unwrap();
    assert!(
        state
            .rbac_service
            .authorize(&manager, MODULE_DISPOSITIVOS, PermissionAction::Delete)
            .await
            .unwrap()
    );
}

//! Isolamento entre tenants: consultas e mutações escopadas.

mod common;

use common::{
    app_state, create_device_fixture, create_user_without_profile, make_superuser,
    register_user, scope_for,
};
use sqlx::PgPool;

use monitoreo::common::error::AppError;
use monitoreo::common::pagination::PageParams;
use monitoreo::models::devices::{DeviceListFilter, UpdateDevicePayload};
use monitoreo::models::telemetry::{
    CreateMeasurementPayload, MeasurementListFilter,
};

// Org1 tem D1; a consulta escopada de U1 devolve exatamente [D1].
#[sqlx::test(migrations = "./migrations")]
async fn scoped_query_returns_own_devices(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;

    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    let (devices, total) = state
        .device_service
        .list_devices(&scope, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();

    assert_eq!(total, 1);
    assert_eq!(devices.len(), 1);
    assert_eq!(devices[0].id, d1.id);
    assert_eq!(devices[0].organization_id, scope.organization_id);
}

// Org2 não tem dispositivos: a consulta de U2 vem vazia, mesmo com D1
// existindo globalmente.
#[sqlx::test(migrations = "./migrations")]
async fn scoped_query_never_leaks_other_tenants(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope1 = scope_for(&state, &u1).await;
    create_device_fixture(&state, &scope1, "Temp", "North", "D1").await;

    let u2 = register_user(&state, "u2@test.com", "Org2", "org2@test.com").await;
    let scope2 = scope_for(&state, &u2).await;

    let (devices, total) = state
        .device_service
        .list_devices(&scope2, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();

    assert_eq!(total, 0);
    assert!(devices.is_empty());

    let categories = state.device_service.list_categories(&scope2).await.unwrap();
    assert!(categories.is_empty());
}

// Sem organização resolvível e sem superusuário, tudo vem vazio
// (falha fechada), nunca um erro.
#[sqlx::test(migrations = "./migrations")]
async fn missing_profile_fails_closed(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope1 = scope_for(&state, &u1).await;
    create_device_fixture(&state, &scope1, "Temp", "North", "D1").await;

    let stray = create_user_without_profile(&state, "semperfil@test.com").await;
    let scope = scope_for(&state, &stray).await;
    assert_eq!(scope.organization_id, None);

    let (devices, total) = state
        .device_service
        .list_devices(&scope, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(devices.is_empty());

    assert!(state.device_service.list_zones(&scope).await.unwrap().is_empty());
    assert!(state.device_service.list_sensors(&scope).await.unwrap().is_empty());
}

// Organização tombstonada também resolve para "sem organização".
#[sqlx::test(migrations = "./migrations")]
async fn tombstoned_organization_resolves_to_none(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let org_id = scope.organization_id.unwrap();

    sqlx::query("UPDATE organizations SET deleted_at = now() WHERE id = $1")
        .bind(org_id)
        .execute(&pool)
        .await
        .unwrap();

    let resolved = state.tenancy_service.resolve_organization(&u1).await.unwrap();
    assert!(resolved.is_none());
}

// Mutação cruzada entre tenants responde NotFound, nunca Forbidden:
// a existência da linha alheia não pode vazar.
#[sqlx::test(migrations = "./migrations")]
async fn cross_tenant_mutation_answers_not_found(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope1 = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope1, "Temp", "North", "D1").await;

    let u2 = register_user(&state, "u2@test.com", "Org2", "org2@test.com").await;
    let scope2 = scope_for(&state, &u2).await;

    let payload = UpdateDevicePayload {
        name: Some("Invadido".to_string()),
        category_id: None,
        zone_id: None,
        reference: None,
        status: None,
    };
    let err = state.device_service.update_device(&scope2, d1.id, &payload).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    let err = state.device_service.delete_device(&scope2, d1.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound));

    // E o dispositivo continua intacto para o dono.
    let device = state.device_service.get_device(&scope1, d1.id).await.unwrap();
    assert_eq!(device.name, "D1");
}

// A criação carimba a organização do autor; filhos (medições) herdam o
// escopo através do dispositivo dono.
#[sqlx::test(migrations = "./migrations")]
async fn create_stamps_organization_and_children_follow(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope1 = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope1, "Temp", "North", "D1").await;

    let measurement = state
        .telemetry_service
        .create_measurement(
            &scope1,
            &CreateMeasurementPayload {
                device_id: d1.id,
                value: rust_decimal::Decimal::new(23500, 3),
                unit: "°C".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(measurement.organization_id, scope1.organization_id);

    let u2 = register_user(&state, "u2@test.com", "Org2", "org2@test.com").await;
    let scope2 = scope_for(&state, &u2).await;

    let (visible, total) = state
        .telemetry_service
        .list_measurements(&scope2, &MeasurementListFilter::default(), &PageParams::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(visible.is_empty());
}

// Superusuário enxerga além do próprio tenant.
#[sqlx::test(migrations = "./migrations")]
async fn superuser_bypasses_scoping(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope1 = scope_for(&state, &u1).await;
    create_device_fixture(&state, &scope1, "Temp", "North", "D1").await;

    let u2 = register_user(&state, "u2@test.com", "Org2", "org2@test.com").await;
    let scope2 = scope_for(&state, &u2).await;
    create_device_fixture(&state, &scope2, "Hum", "South", "D2").await;

    let root = register_user(&state, "root@test.com", "Org3", "org3@test.com").await;
    make_superuser(&pool, root.id).await;
    let root = monitoreo::db::UserRepository::new(pool.clone())
        .find_by_id(root.id)
        .await
        .unwrap()
        .unwrap();
    let root_scope = scope_for(&state, &root).await;

    let (devices, total) = state
        .device_service
        .list_devices(&root_scope, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(devices.len(), 2);
}

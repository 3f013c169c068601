//! Ciclo de vida de exclusão lógica: tombstone, restauração e exclusão
//! física com cascata.

mod common;

use common::{app_state, create_device_fixture, register_user, scope_for};
use sqlx::PgPool;

use monitoreo::common::pagination::PageParams;
use monitoreo::db::LifecycleManager;
use monitoreo::models::devices::{Device, DeviceListFilter};

// delete -> some da visão viva; restore -> volta; hard_delete -> some
// das duas visões.
#[sqlx::test(migrations = "./migrations")]
async fn soft_delete_round_trip(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    let devices: LifecycleManager<Device> = LifecycleManager::new(pool.clone());

    // Exclusão lógica
    state.device_service.delete_device(&scope, d1.id).await.unwrap();

    let live = devices.list_live(&scope).await.unwrap();
    assert!(live.is_empty());

    // A visão de auditoria ainda enxerga o tombstone.
    let all = devices.list_all(&scope).await.unwrap();
    assert_eq!(all.len(), 1);
    assert!(all[0].deleted_at.is_some());

    // Restauração
    state.device_service.restore_device(&scope, d1.id).await.unwrap();
    let live = devices.list_live(&scope).await.unwrap();
    assert_eq!(live.len(), 1);
    assert!(live[0].deleted_at.is_none());

    // Exclusão física: some das duas visões.
    state.device_service.hard_delete_device(&scope, d1.id).await.unwrap();
    assert!(devices.list_live(&scope).await.unwrap().is_empty());
    assert!(devices.list_all(&scope).await.unwrap().is_empty());
}

// Excluir duas vezes não é erro: o segundo delete só renova o carimbo.
#[sqlx::test(migrations = "./migrations")]
async fn soft_delete_is_idempotent(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    let devices: LifecycleManager<Device> = LifecycleManager::new(pool.clone());

    let first = devices.soft_delete(&pool, d1.id).await.unwrap();
    let second = devices.soft_delete(&pool, d1.id).await.unwrap();
    assert!(second >= first);

    let all = devices.list_all(&scope).await.unwrap();
    assert!(all[0].deleted_at.is_some());
}

// Restaurar algo já vivo também não é erro.
#[sqlx::test(migrations = "./migrations")]
async fn restore_of_live_row_is_noop(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    state.device_service.restore_device(&scope, d1.id).await.unwrap();
    let device = state.device_service.get_device(&scope, d1.id).await.unwrap();
    assert!(device.deleted_at.is_none());
}

// Cenário da listagem: depois do tombstone a consulta escopada vem
// vazia; depois do restore, D1 reaparece.
#[sqlx::test(migrations = "./migrations")]
async fn tombstoned_rows_leave_default_lists(pool: PgPool) {
    let state = app_state(pool);
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    state.device_service.delete_device(&scope, d1.id).await.unwrap();

    let (devices, total) = state
        .device_service
        .list_devices(&scope, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();
    assert_eq!(total, 0);
    assert!(devices.is_empty());

    state.device_service.restore_device(&scope, d1.id).await.unwrap();

    let (devices, total) = state
        .device_service
        .list_devices(&scope, &DeviceListFilter::default(), &PageParams::default())
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(devices[0].id, d1.id);
}

// O tombstone do dispositivo preserva o histórico: medições e alertas
// continuam vivos e consultáveis na auditoria.
#[sqlx::test(migrations = "./migrations")]
async fn device_tombstone_keeps_history(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (_, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    state
        .telemetry_service
        .create_measurement(
            &scope,
            &monitoreo::models::telemetry::CreateMeasurementPayload {
                device_id: d1.id,
                value: rust_decimal::Decimal::new(21000, 3),
                unit: "°C".to_string(),
                date: None,
            },
        )
        .await
        .unwrap();

    state.device_service.delete_device(&scope, d1.id).await.unwrap();

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM measurements WHERE device_id = $1")
            .bind(d1.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);
}

// Decisão registrada no DESIGN: a exclusão lógica de categoria NÃO
// propaga; a física arrasta os dispositivos pela cascata de FK.
#[sqlx::test(migrations = "./migrations")]
async fn category_hard_delete_cascades_but_soft_does_not(pool: PgPool) {
    let state = app_state(pool.clone());
    let u1 = register_user(&state, "u1@test.com", "Org1", "org1@test.com").await;
    let scope = scope_for(&state, &u1).await;
    let (c1, _, d1) = create_device_fixture(&state, &scope, "Temp", "North", "D1").await;

    // Tombstone da categoria: o dispositivo segue vivo.
    state.device_service.delete_category(&scope, c1.id).await.unwrap();
    let device = state.device_service.get_device(&scope, d1.id).await.unwrap();
    assert!(device.deleted_at.is_none());

    // Exclusão física: a FK arrasta o dispositivo.
    state.device_service.hard_delete_category(&scope, c1.id).await.unwrap();

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM devices WHERE id = $1")
        .bind(d1.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

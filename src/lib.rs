//! Monitoreo - backend multi-tenant de monitoramento de ativos IoT.

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, patch, post, put},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

pub fn create_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::users::list_users))
        .route("/me", get(handlers::auth::get_me))
        .route("/me/password", post(handlers::auth::change_password))
        .route(
            "/me/profile",
            get(handlers::users::get_my_profile).put(handlers::users::update_my_profile),
        )
        .route("/{id}/groups", post(handlers::users::assign_group));

    let organization_routes = Router::new()
        .route("/", get(handlers::users::list_organizations))
        .route("/me", get(handlers::users::my_organization))
        .route("/all", get(handlers::users::list_organizations_all))
        .route(
            "/{id}",
            put(handlers::users::update_organization)
                .delete(handlers::users::delete_organization),
        )
        .route("/{id}/restore", post(handlers::users::restore_organization))
        .route("/{id}/hard", axum::routing::delete(handlers::users::hard_delete_organization));

    let rbac_routes = Router::new()
        .route(
            "/modules",
            get(handlers::rbac::list_modules).post(handlers::rbac::create_module),
        )
        .route("/roles", post(handlers::rbac::create_role))
        .route(
            "/permissions",
            post(handlers::rbac::create_permission).put(handlers::rbac::update_permission),
        )
        .route("/matrix", get(handlers::rbac::list_matrix));

    let device_routes = Router::new()
        .route("/", get(handlers::devices::list_devices).post(handlers::devices::create_device))
        .route(
            "/{id}",
            get(handlers::devices::get_device)
                .put(handlers::devices::update_device)
                .delete(handlers::devices::delete_device),
        )
        .route("/{id}/restore", post(handlers::devices::restore_device))
        .route("/{id}/hard", axum::routing::delete(handlers::devices::hard_delete_device));

    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::devices::list_categories).post(handlers::devices::create_category),
        )
        .route(
            "/{id}",
            put(handlers::devices::update_category).delete(handlers::devices::delete_category),
        )
        .route("/{id}/restore", post(handlers::devices::restore_category))
        .route("/{id}/hard", axum::routing::delete(handlers::devices::hard_delete_category));

    let zone_routes = Router::new()
        .route("/", get(handlers::devices::list_zones).post(handlers::devices::create_zone))
        .route(
            "/{id}",
            put(handlers::devices::update_zone).delete(handlers::devices::delete_zone),
        )
        .route("/{id}/restore", post(handlers::devices::restore_zone))
        .route("/{id}/hard", axum::routing::delete(handlers::devices::hard_delete_zone));

    let sensor_routes = Router::new()
        .route("/", get(handlers::devices::list_sensors).post(handlers::devices::create_sensor))
        .route(
            "/{id}",
            put(handlers::devices::update_sensor).delete(handlers::devices::delete_sensor),
        )
        .route("/{id}/restore", post(handlers::devices::restore_sensor));

    let measurement_routes = Router::new()
        .route(
            "/",
            get(handlers::telemetry::list_measurements)
                .post(handlers::telemetry::create_measurement),
        )
        .route(
            "/{id}",
            put(handlers::telemetry::update_measurement)
                .delete(handlers::telemetry::delete_measurement),
        )
        .route("/{id}/restore", post(handlers::telemetry::restore_measurement));

    let alert_routes = Router::new()
        .route("/", get(handlers::telemetry::list_alerts).post(handlers::telemetry::create_alert))
        .route("/{id}", axum::routing::delete(handlers::telemetry::delete_alert))
        .route("/{id}/read", patch(handlers::telemetry::mark_alert_read));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::get_dashboard))
        .route("/admin", get(handlers::dashboard::admin_overview));

    let export_routes = Router::new()
        .route("/devices", get(handlers::dashboard::export_devices))
        .route("/measurements", get(handlers::dashboard::export_measurements));

    // Tudo que não é público passa pelo auth_guard.
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/organizations", organization_routes)
        .nest("/api/rbac", rbac_routes)
        .nest("/api/devices", device_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/zones", zone_routes)
        .nest("/api/sensors", sensor_routes)
        .nest("/api/measurements", measurement_routes)
        .nest("/api/alerts", alert_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/export", export_routes)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), auth_guard));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state)
}

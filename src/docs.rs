// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::change_password,
        handlers::users::get_my_profile,
        handlers::users::update_my_profile,
        handlers::users::list_users,
        handlers::users::assign_group,

        // --- Organizations ---
        handlers::users::my_organization,
        handlers::users::list_organizations,
        handlers::users::list_organizations_all,
        handlers::users::update_organization,
        handlers::users::delete_organization,
        handlers::users::restore_organization,
        handlers::users::hard_delete_organization,

        // --- RBAC ---
        handlers::rbac::list_modules,
        handlers::rbac::create_module,
        handlers::rbac::create_role,
        handlers::rbac::create_permission,
        handlers::rbac::update_permission,
        handlers::rbac::list_matrix,

        // --- Dispositivos ---
        handlers::devices::list_devices,
        handlers::devices::get_device,
        handlers::devices::create_device,
        handlers::devices::update_device,
        handlers::devices::delete_device,
        handlers::devices::restore_device,
        handlers::devices::hard_delete_device,
        handlers::devices::list_categories,
        handlers::devices::create_category,
        handlers::devices::update_category,
        handlers::devices::delete_category,
        handlers::devices::restore_category,
        handlers::devices::hard_delete_category,
        handlers::devices::list_zones,
        handlers::devices::create_zone,
        handlers::devices::update_zone,
        handlers::devices::delete_zone,
        handlers::devices::restore_zone,
        handlers::devices::hard_delete_zone,
        handlers::devices::list_sensors,
        handlers::devices::create_sensor,
        handlers::devices::update_sensor,
        handlers::devices::delete_sensor,
        handlers::devices::restore_sensor,

        // --- Telemetria ---
        handlers::telemetry::list_measurements,
        handlers::telemetry::create_measurement,
        handlers::telemetry::update_measurement,
        handlers::telemetry::delete_measurement,
        handlers::telemetry::restore_measurement,
        handlers::telemetry::list_alerts,
        handlers::telemetry::create_alert,
        handlers::telemetry::mark_alert_read,
        handlers::telemetry::delete_alert,

        // --- Dashboard ---
        handlers::dashboard::get_dashboard,
        handlers::dashboard::admin_overview,
        handlers::dashboard::export_devices,
        handlers::dashboard::export_measurements,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::ChangePasswordPayload,
            models::auth::AuthResponse,

            // --- Lifecycle ---
            models::lifecycle::EntityStatus,

            // --- Tenancy ---
            models::tenancy::Organization,
            models::tenancy::UserProfile,
            models::tenancy::UpdateProfilePayload,
            models::tenancy::UpdateOrganizationPayload,

            // --- RBAC ---
            models::rbac::Module,
            models::rbac::Group,
            models::rbac::Role,
            models::rbac::RoleModulePermission,
            models::rbac::PermissionAction,
            models::rbac::PermissionFlags,
            models::rbac::CreateModulePayload,
            models::rbac::CreateRolePayload,
            models::rbac::SetPermissionPayload,
            models::rbac::MatrixEntry,

            // --- Dispositivos ---
            models::devices::Category,
            models::devices::Zone,
            models::devices::Device,
            models::devices::DeviceDetail,
            models::devices::Sensor,
            models::devices::CreateCategoryPayload,
            models::devices::UpdateCategoryPayload,
            models::devices::CreateZonePayload,
            models::devices::UpdateZonePayload,
            models::devices::CreateDevicePayload,
            models::devices::UpdateDevicePayload,
            models::devices::CreateSensorPayload,
            models::devices::UpdateSensorPayload,

            // --- Telemetria ---
            models::telemetry::Measurement,
            models::telemetry::Alert,
            models::telemetry::AlertLevel,
            models::telemetry::CreateMeasurementPayload,
            models::telemetry::UpdateMeasurementPayload,
            models::telemetry::CreateAlertPayload,

            // --- Dashboard ---
            models::dashboard::DashboardSummary,
            models::dashboard::AlertCounts,
            models::dashboard::ZoneDeviceCount,
            models::dashboard::MeasurementsPerDay,
            models::dashboard::RecentDevice,
            models::dashboard::DashboardResponse,
            models::dashboard::AdminOverview,
            models::dashboard::DeviceExportRow,
            models::dashboard::MeasurementExportRow,

            // --- Payloads locais ---
            handlers::users::AssignGroupPayload,
            handlers::telemetry::MarkReadPayload,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Usuários, Perfis e Organizações"),
        (name = "RBAC", description = "Controle de Acesso (Cargos e Permissões)"),
        (name = "Dispositivos", description = "Dispositivos, Categorias, Zonas e Sensores"),
        (name = "Telemetria", description = "Medições e Alertas"),
        (name = "Dashboard", description = "Indicadores e Exportações")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

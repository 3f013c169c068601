pub mod auth;
pub mod dashboard_service;
pub mod device_service;
pub mod rbac_service;
pub mod telemetry_service;
pub mod tenancy_service;

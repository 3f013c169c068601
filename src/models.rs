pub mod auth;
pub mod dashboard;
pub mod devices;
pub mod lifecycle;
pub mod rbac;
pub mod telemetry;
pub mod tenancy;

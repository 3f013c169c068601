pub mod scope;
pub use scope::{OrgRelation, TenantScope, Visibility};
pub mod lifecycle;
pub use lifecycle::{LifecycleManager, LifecycleModel};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod tenancy_repo;
pub use tenancy_repo::TenancyRepository;
pub mod rbac_repo;
pub use rbac_repo::RbacRepository;
pub mod device_repo;
pub use device_repo::DeviceRepository;
pub mod telemetry_repo;
pub use telemetry_repo::TelemetryRepository;
pub mod dashboard_repo;
pub use dashboard_repo::DashboardRepository;

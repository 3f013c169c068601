// src/config.rs

use sqlx::{PgPool, postgres::PgPoolOptions};
use std::{env, time::Duration};

use crate::db::{
    DashboardRepository, DeviceRepository, RbacRepository, TelemetryRepository,
    TenancyRepository, UserRepository,
};
use crate::services::{
    auth::AuthService, dashboard_service::DashboardService, device_service::DeviceService,
    rbac_service::RbacService, telemetry_service::TelemetryService,
    tenancy_service::TenancyService,
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub tenancy_service: TenancyService,
    pub rbac_service: RbacService,
    pub device_service: DeviceService,
    pub telemetry_service: TelemetryService,
    pub dashboard_service: DashboardService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::from_pool(db_pool, jwt_secret))
    }

    // Monta o gráfico de dependências a partir de uma pool já criada.
    // Os testes de integração usam este caminho.
    pub fn from_pool(db_pool: PgPool, jwt_secret: String) -> Self {
        let user_repo = UserRepository::new(db_pool.clone());
        let tenancy_repo = TenancyRepository::new(db_pool.clone());
        let rbac_repo = RbacRepository::new(db_pool.clone());
        let device_repo = DeviceRepository::new(db_pool.clone());
        let telemetry_repo = TelemetryRepository::new(db_pool.clone());
        let dashboard_repo = DashboardRepository::new(db_pool.clone());

        let auth_service = AuthService::new(
            user_repo.clone(),
            tenancy_repo.clone(),
            jwt_secret,
            db_pool.clone(),
        );
        let tenancy_service =
            TenancyService::new(tenancy_repo, user_repo, db_pool.clone());
        let rbac_service = RbacService::new(rbac_repo, db_pool.clone());
        let device_service =
            DeviceService::new(device_repo, telemetry_repo.clone(), db_pool.clone());
        let telemetry_service = TelemetryService::new(telemetry_repo, db_pool.clone());
        let dashboard_service = DashboardService::new(dashboard_repo);

        Self {
            db_pool,
            auth_service,
            tenancy_service,
            rbac_service,
            device_service,
            telemetry_service,
            dashboard_service,
        }
    }
}

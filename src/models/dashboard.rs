// src/models/dashboard.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::lifecycle::EntityStatus;
use crate::models::telemetry::{Alert, AlertLevel, Measurement};

// Totais gerais da organização (somente linhas vivas).
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_devices: i64,
    pub total_measurements: i64,
    pub total_alerts: i64,
    pub total_zones: i64,
}

// Alertas da última semana classificados por severidade.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertCounts {
    pub grave: i64,
    pub alta: i64,
    pub media: i64,
}

impl AlertCounts {
    pub fn set(&mut self, level: AlertLevel, count: i64) {
        match level {
            AlertLevel::Grave => self.grave = count,
            AlertLevel::Alta => self.alta = count,
            AlertLevel::Media => self.media = count,
        }
    }
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ZoneDeviceCount {
    pub zone_id: Uuid,
    pub zone_name: String,
    pub device_count: i64,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementsPerDay {
    pub day: NaiveDate,
    pub count: i64,
}

// Linha "recente" de dispositivo com os nomes já resolvidos,
// como a tela do dashboard exibe.
#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentDevice {
    pub id: Uuid,
    pub name: String,
    pub reference: String,
    pub category_name: String,
    pub zone_name: String,
    pub created_at: DateTime<Utc>,
}

// Resposta completa do dashboard da organização.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub summary: DashboardSummary,
    pub latest_measurements: Vec<Measurement>,
    pub zones_with_devices: Vec<ZoneDeviceCount>,
    pub recent_devices: Vec<RecentDevice>,
    pub alert_counts: AlertCounts,
    pub recent_alerts: Vec<Alert>,
    pub measurements_by_day: Vec<MeasurementsPerDay>,
}

// Totais globais, visíveis apenas para superusuários.
#[derive(Debug, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminOverview {
    pub total_users: i64,
    pub total_devices: i64,
    pub total_measurements: i64,
    pub total_alerts: i64,
}

// ---
// Projeções de exportação
// ---
// Linhas prontas para a planilha; a formatação do arquivo é do colaborador
// externo. Exportações nunca enxergam linhas tombstonadas.

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceExportRow {
    pub name: String,
    pub category_name: String,
    pub zone_name: String,
    pub reference: String,
    pub status: EntityStatus,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementExportRow {
    pub device_name: String,
    pub value: Decimal,
    pub unit: String,
    pub date: DateTime<Utc>,
}

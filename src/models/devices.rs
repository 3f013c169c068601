// src/models/devices.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lifecycle::EntityStatus;
use crate::models::telemetry::{Alert, Measurement};

// ---
// Taxonomia: Category e Zone
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,

    #[schema(example = "Temp")]
    pub name: String,

    pub description: String,

    // Anulável apenas para dados de bootstrap/migração; consultas escopadas
    // nunca devolvem linhas de outra organização.
    pub organization_id: Option<Uuid>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: Uuid,

    #[schema(example = "North")]
    pub name: String,

    pub description: String,
    pub organization_id: Option<Uuid>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// Device
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,

    #[schema(example = "D1")]
    pub name: String,

    #[schema(example = "REF-0001")]
    pub reference: String,

    pub category_id: Uuid,
    pub zone_id: Uuid,
    pub organization_id: Option<Uuid>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Detalhe do dispositivo com o histórico associado (medições e alertas
// sobrevivem ao tombstone do dispositivo; aqui só aparecem as vivas).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub measurements: Vec<Measurement>,
    pub alerts: Vec<Alert>,
}

// ---
// Sensor
// ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Sensor {
    pub id: Uuid,
    pub device_id: Uuid,

    #[schema(example = "Sensor de temperatura")]
    pub name: String,

    // Tipo do sensor, ex. temperatura, humedad. A coluna persiste como
    // "type"; `type` é palavra reservada em Rust.
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    #[schema(example = "temperatura")]
    pub sensor_type: String,

    // Unidade de medida, ex. °C, %
    #[schema(example = "°C")]
    pub unit: String,

    pub organization_id: Option<Uuid>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// Payloads
// ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateZonePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: String,

    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateZonePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<EntityStatus>,
}

// A organização NÃO é aceita do cliente: é sempre carimbada a partir do
// usuário autenticado pela camada de escopo.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDevicePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: String,

    pub category_id: Uuid,
    pub zone_id: Uuid,

    #[serde(default)]
    #[validate(length(max = 100, message = "A referência deve ter no máximo 100 caracteres."))]
    pub reference: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDevicePayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub zone_id: Option<Uuid>,
    #[validate(length(max = 100, message = "A referência deve ter no máximo 100 caracteres."))]
    pub reference: Option<String>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSensorPayload {
    pub device_id: Uuid,

    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: String,

    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "O tipo deve ter entre 1 e 50 caracteres."))]
    pub sensor_type: String,

    #[validate(length(min = 1, max = 20, message = "A unidade deve ter entre 1 e 20 caracteres."))]
    pub unit: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSensorPayload {
    #[validate(length(min = 1, max = 100, message = "O nome deve ter entre 1 e 100 caracteres."))]
    pub name: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 50, message = "O tipo deve ter entre 1 e 50 caracteres."))]
    pub sensor_type: Option<String>,
    #[validate(length(min = 1, max = 20, message = "A unidade deve ter entre 1 e 20 caracteres."))]
    pub unit: Option<String>,
    pub status: Option<EntityStatus>,
}

// Filtros da listagem de dispositivos (busca, categoria e ordenação).
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeviceListFilter {
    pub search: Option<String>,
    pub category_id: Option<Uuid>,
    pub sort: Option<String>,
}

// src/models/telemetry.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::lifecycle::EntityStatus;

// Medição emitida por um dispositivo. `date` é o instante do evento,
// distinto de created_at (instante de inserção).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Measurement {
    pub id: Uuid,
    pub device_id: Uuid,

    #[schema(example = "23.500")]
    pub value: Decimal,

    #[schema(example = "°C")]
    pub unit: String,

    pub date: DateTime<Utc>,
    pub organization_id: Option<Uuid>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// Severidade em ordem decrescente: GRAVE > ALTA > MEDIA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "alert_level", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    Grave,
    Alta,
    Media,
}

impl Default for AlertLevel {
    fn default() -> Self {
        AlertLevel::Media
    }
}

// Alertas são inseridos manualmente ou por scripts; não há motor de
// avaliação de limiares neste serviço.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: Uuid,
    pub device_id: Uuid,

    #[schema(example = "Temperatura fora do intervalo")]
    pub message: String,

    pub level: AlertLevel,
    pub read: bool,
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
pub struct CreateMeasurementPayload {
    pub device_id: Uuid,

    pub value: Decimal,

    #[serde(default)]
    #[validate(length(max = 20, message = "A unidade deve ter no máximo 20 caracteres."))]
    pub unit: String,

    // Se omitido, o instante do evento é o de inserção.
    pub date: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMeasurementPayload {
    pub value: Option<Decimal>,
    #[validate(length(max = 20, message = "A unidade deve ter no máximo 20 caracteres."))]
    pub unit: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub status: Option<EntityStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertPayload {
    pub device_id: Uuid,

    #[validate(length(min = 1, max = 250, message = "A mensagem deve ter entre 1 e 250 caracteres."))]
    pub message: String,

    #[serde(default)]
    pub level: AlertLevel,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AlertListFilter {
    pub level: Option<AlertLevel>,
    pub read: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementListFilter {
    pub device_id: Option<Uuid>,
    pub sort: Option<String>,
}

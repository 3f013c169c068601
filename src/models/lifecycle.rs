// src/models/lifecycle.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// Estado operacional comum às entidades de negócio.
// Não confundir com o tombstone (deleted_at): um registro INACTIVE
// continua vivo e visível nas listagens padrão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "entity_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityStatus {
    Active,
    Inactive,
}

impl Default for EntityStatus {
    fn default() -> Self {
        EntityStatus::Active
    }
}

// src/models/tenancy.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::lifecycle::EntityStatus;

// ---
// 1. Organization (a raiz do tenant)
// ---
// A unidade de isolamento de dados: todo registro de negócio pertence
// (direta ou transitivamente) a uma organização.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    pub id: Uuid,

    #[schema(example = "Org1")]
    pub name: String,

    #[schema(example = "org1@test.com")]
    pub email: String,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// 2. UserProfile (a "ponte" Usuário-Organização)
// ---
// 1:1 com o usuário; é através dele que o escopo do tenant é resolvido.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub user_id: Uuid,

    // Obrigatória aqui, diferente das demais entidades.
    pub organization_id: Uuid,

    #[schema(example = "12345678-5")]
    pub rut: Option<String>,

    pub telefono: String,
    pub direccion: String,
    pub profile_image: Option<String>,

    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    #[validate(custom(function = "validate_rut"))]
    pub rut: Option<String>,

    #[validate(length(max = 20, message = "O telefone deve ter no máximo 20 caracteres."))]
    pub telefono: Option<String>,

    pub direccion: Option<String>,

    #[validate(custom(function = "validate_profile_image_name"))]
    pub profile_image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrganizationPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: Option<String>,

    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: Option<String>,

    pub status: Option<EntityStatus>,
}

// Limites da imagem de perfil. A checagem de bytes/dimensões acontece no
// colaborador que recebe o upload; o núcleo valida os metadados declarados.
pub const PROFILE_IMAGE_MAX_BYTES: u64 = 5 * 1024 * 1024;
pub const PROFILE_IMAGE_MAX_DIMENSION: u32 = 1000;
pub const PROFILE_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

pub fn validate_profile_image_name(name: &str) -> Result<(), ValidationError> {
    let extension = name.rsplit('.').next().map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if PROFILE_IMAGE_EXTENSIONS.contains(&ext.as_str()) => Ok(()),
        _ => {
            let mut err = ValidationError::new("extension");
            err.message = Some("A imagem deve ser jpg, jpeg ou png.".into());
            Err(err)
        }
    }
}

pub fn validate_profile_image_meta(
    size_bytes: u64,
    width: u32,
    height: u32,
) -> Result<(), ValidationError> {
    if size_bytes > PROFILE_IMAGE_MAX_BYTES {
        let mut err = ValidationError::new("size");
        err.message = Some("A imagem deve ter no máximo 5MB.".into());
        return Err(err);
    }
    if width > PROFILE_IMAGE_MAX_DIMENSION || height > PROFILE_IMAGE_MAX_DIMENSION {
        let mut err = ValidationError::new("dimensions");
        err.message = Some("A imagem deve ter no máximo 1000x1000.".into());
        return Err(err);
    }
    Ok(())
}

// RUT chileno: 7-8 dígitos, hífen e dígito verificador (número ou K).
// O formato completo é preocupação do formulário; aqui só a forma geral.
pub fn validate_rut(rut: &str) -> Result<(), ValidationError> {
    let invalid = || {
        let mut err = ValidationError::new("rut");
        err.message = Some("O RUT deve ter o formato 12345678-5.".into());
        err
    };

    let Some((digits, verifier)) = rut.split_once('-') else {
        return Err(invalid());
    };
    if !(7..=8).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if verifier.len() != 1 {
        return Err(invalid());
    }
    let v = verifier.chars().next().unwrap();
    if !(v.is_ascii_digit() || v.eq_ignore_ascii_case(&'k')) {
        return Err(invalid());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rut_accepts_digit_and_k_verifiers() {
        assert!(validate_rut("12345678-5").is_ok());
        assert!(validate_rut("1234567-K").is_ok());
    }

    #[test]
    fn rut_rejects_malformed() {
        assert!(validate_rut("12345678").is_err());
        assert!(validate_rut("123-5").is_err());
        assert!(validate_rut("12345678-55").is_err());
        assert!(validate_rut("1234567a-5").is_err());
    }

    #[test]
    fn profile_image_name_checks_extension() {
        assert!(validate_profile_image_name("foto.png").is_ok());
        assert!(validate_profile_image_name("foto.JPG").is_ok());
        assert!(validate_profile_image_name("foto.gif").is_err());
        assert!(validate_profile_image_name("sem_extensao").is_err());
    }

    #[test]
    fn profile_image_meta_enforces_limits() {
        assert!(validate_profile_image_meta(1024, 800, 600).is_ok());
        assert!(validate_profile_image_meta(PROFILE_IMAGE_MAX_BYTES + 1, 10, 10).is_err());
        assert!(validate_profile_image_meta(1024, 1001, 10).is_err());
        assert!(validate_profile_image_meta(1024, 10, 1001).is_err());
    }
}

// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(example = "ana@org1.cl")]
    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,

    // Superusuários ignoram o escopo de organização e a matriz de permissões
    pub is_superuser: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Registro: cria usuário + organização + perfil numa única transação,
// como a tela de cadastro original.
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(length(min = 1, message = "O nome da organização é obrigatório."))]
    pub organization_name: String,

    #[validate(email(message = "O e-mail da organização é inválido."))]
    pub organization_email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordPayload {
    #[validate(length(min = 1, message = "A senha atual é obrigatória."))]
    pub old_password: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password1: String,

    pub new_password2: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}

// Regras herdadas da tela de troca de senha: mínimo 8 caracteres,
// pelo menos uma maiúscula e pelo menos um dígito.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.len() < 8 {
        let mut err = ValidationError::new("length");
        err.message = Some("A senha deve ter no mínimo 8 caracteres.".into());
        return Err(err);
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        let mut err = ValidationError::new("uppercase");
        err.message = Some("A senha deve conter ao menos uma letra maiúscula.".into());
        return Err(err);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        let mut err = ValidationError::new("digit");
        err.message = Some("A senha deve conter ao menos um número.".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_strength_accepts_valid() {
        assert!(validate_password_strength("Segura123").is_ok());
    }

    #[test]
    fn password_strength_rejects_short() {
        assert!(validate_password_strength("Ab1").is_err());
    }

    #[test]
    fn password_strength_rejects_missing_uppercase() {
        assert!(validate_password_strength("segura123").is_err());
    }

    #[test]
    fn password_strength_rejects_missing_digit() {
        assert!(validate_password_strength("SeguraSegura").is_err());
    }
}

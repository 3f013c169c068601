// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TenancyRepository, UserRepository},
    models::auth::{Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    tenancy_repo: TenancyRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(
        user_repo: UserRepository,
        tenancy_repo: TenancyRepository,
        jwt_secret: String,
        pool: PgPool,
    ) -> Self {
        Self { user_repo, tenancy_repo, jwt_secret, pool }
    }

    // Registro: usuário + organização + perfil nascem juntos ou não nascem.
    // Se qualquer passo falhar, a transação desfaz os anteriores.
    pub async fn register_user(
        &self,
        email: &str,
        password: &str,
        organization_name: &str,
        organization_email: &str,
    ) -> Result<String, AppError> {
        // 1. Hashing (fora da transação, não toca no banco)
        let password_clone = password.to_owned();
        let password_hash =
            tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Transação: usuário, organização e perfil
        let mut tx = self.pool.begin().await?;

        let new_user = self.user_repo.create_user(&mut *tx, email, &password_hash).await?;

        let organization = self
            .tenancy_repo
            .create_organization(&mut *tx, organization_name, organization_email)
            .await?;

        self.tenancy_repo.create_profile(&mut *tx, new_user.id, organization.id).await?;

        tx.commit().await?;

        // 3. Gera o token
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em uma thread separada
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    // Troca de senha autenticada: exige a senha atual correta.
    // A complexidade da nova senha já foi validada no payload.
    pub async fn change_password(
        &self,
        user: &User,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        let old_clone = old_password.to_owned();
        let hash_clone = user.password_hash.clone();
        let old_is_valid =
            tokio::task::spawn_blocking(move || verify(&old_clone, &hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !old_is_valid {
            return Err(AppError::InvalidCredentials);
        }

        let new_clone = new_password.to_owned();
        let new_hash =
            tokio::task::spawn_blocking(move || hash(&new_clone, bcrypt::DEFAULT_COST))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        self.user_repo.update_password(&self.pool, user.id, &new_hash).await?;
        Ok(())
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

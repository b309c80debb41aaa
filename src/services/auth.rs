// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use validator::Validate;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{ChangePasswordPayload, Claims, User},
};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    token_ttl: chrono::Duration,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        token_ttl: chrono::Duration,
        bcrypt_cost: u32,
    ) -> Self {
        Self { user_repo, jwt_secret, token_ttl, bcrypt_cost }
    }

    /// Cria o operador padrão quando a tabela de usuários está vazia.
    pub async fn ensure_default_user(&self, username: &str, password: &str) -> Result<bool, AppError> {
        if self.user_repo.has_any_user().await? {
            return Ok(false);
        }

        let hashed_password = self.hash_password(password).await?;
        self.user_repo.create_user(username, &hashed_password).await?;
        tracing::info!(username, "Default user created");
        Ok(true)
    }

    /// O usuário existe e a senha confere com o hash guardado?
    pub async fn verify_credentials(&self, username: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self.user_repo.find_by_username(username).await? else {
            return Ok(None);
        };

        if self.password_matches(password, &user.password_hash).await? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    pub async fn login_user(&self, username: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .verify_credentials(username, password)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        tracing::info!(username = %user.username, "User logged in");
        self.create_token(&user.username)
    }

    /// Troca a senha do operador da sessão. Tudo é validado antes da escrita.
    pub async fn rotate_password(&self, user: &User, payload: &ChangePasswordPayload) -> Result<(), AppError> {
        payload.validate()?;

        // Relê o usuário: o hash da sessão pode estar desatualizado.
        let current = self
            .verify_credentials(&user.username, &payload.current_password)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let new_hash = self.hash_password(&payload.new_password).await?;
        self.user_repo.update_password_hash(current.id, &new_hash).await?;

        tracing::info!(username = %current.username, "Password updated");
        Ok(())
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
            .find_by_username(&token_data.claims.sub)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    fn create_token(&self, username: &str) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = Claims {
            sub: username.to_string(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Password hashing task failed: {}", e))??;
        Ok(hashed)
    }

    async fn password_matches(&self, password: &str, password_hash: &str) -> Result<bool, AppError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        let is_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Password verification task failed: {}", e))??;
        Ok(is_valid)
    }
}

// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

// Representa o operador vindo do banco de dados
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    pub created_at: DateTime<Utc>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginUserPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password required"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "Username and password required"))]
    pub password: String,
}

// Troca de senha do operador logado
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordPayload {
    #[serde(default)]
    #[validate(length(min = 1, message = "current_password is required"))]
    pub current_password: String,
    #[serde(default)]
    #[validate(
        length(min = 6, message = "Password must be at least 6 characters"),
        must_match(other = "confirm_password", message = "New passwords do not match")
    )]
    pub new_password: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "confirm_password is required"))]
    pub confirm_password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub username: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (username do operador)
    pub exp: usize,  // Expiration time
    pub iat: usize,  // Issued At
}

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Falhas do `validator` (payloads com derive)
    #[error("Validation failed")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação manual: a mensagem já nomeia o campo
    #[error("{0}")]
    InvalidInput(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or missing token")]
    InvalidToken,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Bcrypt error: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    pub fn invalid(message: impl Into<String>) -> Self {
        AppError::InvalidInput(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidCredentials | AppError::InvalidToken => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Corpo JSON malformado ou com tipos errados
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::invalid("Invalid path parameter")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::ValidationError(errors) => {
                // Ordem fixa por nome de campo: o "error" curto não muda entre chamadas
                let mut details = std::collections::BTreeMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => format!("{} is invalid", field),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                // A primeira mensagem vira o "error" curto, o resto vai em details
                let summary = details
                    .values()
                    .flat_map(|m| m.first())
                    .next()
                    .cloned()
                    .unwrap_or_else(|| "One or more fields are invalid".to_string());
                json!({ "error": summary, "details": details })
            }
            AppError::InvalidInput(message) => json!({ "error": message }),
            AppError::InvalidCredentials => json!({ "error": "Invalid credentials" }),
            AppError::InvalidToken => json!({ "error": "Invalid or missing authentication token" }),
            AppError::NotFound(what) => json!({ "error": format!("{} not found", what) }),

            // Todo o resto vira 500; o detalhe fica só no log.
            ref e => {
                tracing::error!("Internal server error: {}", e);
                json!({ "error": "An unexpected error occurred" })
            }
        };

        (status, Json(body)).into_response()
    }
}

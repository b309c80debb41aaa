// src/handlers/system.rs

use axum::{http::StatusCode, response::IntoResponse, Json};

use crate::models::system::HealthResponse;

// GET /api/health
pub async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse { status: "ok", message: "Receipt ledger is running" }),
    )
}

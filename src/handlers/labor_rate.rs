// src/handlers/labor_rate.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::labor_rate::{LaborRateResponse, LaborRateUpdatedResponse, UpdateLaborRatePayload},
};

// GET /api/labor-rate
pub async fn get_labor_rate(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let rate_per_kg = app_state.labor_rate_service.get_rate().await?;
    Ok((StatusCode::OK, Json(LaborRateResponse { rate_per_kg })))
}

// PUT /api/labor-rate
pub async fn update_labor_rate(
    State(app_state): State<AppState>,
    payload: Result<Json<UpdateLaborRatePayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let rate_per_kg = app_state
        .labor_rate_service
        .set_rate(payload.rate_per_kg.as_ref())
        .await?;

    Ok((
        StatusCode::OK,
        Json(LaborRateUpdatedResponse { message: "Labor rate updated successfully", rate_per_kg }),
    ))
}

// src/handlers/summary.rs

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        receipt::{ReceiptFilter, ReceiptQuery},
        summary::{DailySummaryQuery, MonthlySummaryQuery},
    },
};

// GET /api/summary
pub async fn daily_summary(
    State(app_state): State<AppState>,
    query: Result<Query<DailySummaryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let summary = app_state
        .summary_service
        .daily_summary(query.date.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/monthly-summary
pub async fn monthly_summary(
    State(app_state): State<AppState>,
    query: Result<Query<MonthlySummaryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let summary = app_state
        .summary_service
        .monthly_summary(query.year.as_deref(), query.month.as_deref())
        .await?;
    Ok((StatusCode::OK, Json(summary)))
}

// GET /api/export
pub async fn export_receipts(
    State(app_state): State<AppState>,
    query: Result<Query<ReceiptQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let filter = ReceiptFilter::try_from(query)?;
    let file = app_state.export_service.export(&filter).await?;
    Ok((StatusCode::OK, Json(file)))
}

// src/handlers/receipts.rs

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::{
        receipt::{CreateReceiptPayload, ReceiptCreatedResponse, ReceiptFilter, ReceiptQuery},
        system::MessageResponse,
    },
};

// GET /api/receipts
pub async fn list_receipts(
    State(app_state): State<AppState>,
    query: Result<Query<ReceiptQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query?;
    let filter = ReceiptFilter::try_from(query)?;
    let receipts = app_state.receipt_service.list_receipts(&filter).await?;
    Ok((StatusCode::OK, Json(receipts)))
}

// POST /api/receipts
pub async fn create_receipt(
    State(app_state): State<AppState>,
    payload: Result<Json<CreateReceiptPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    let receipt = app_state.receipt_service.create_receipt(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ReceiptCreatedResponse { message: "Receipt created successfully", receipt_id: receipt.id }),
    ))
}

// DELETE /api/receipts/{id}
pub async fn delete_receipt(
    State(app_state): State<AppState>,
    receipt_id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(receipt_id) = receipt_id?;
    app_state.receipt_service.delete_receipt(receipt_id).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse { message: "Receipt deleted successfully" }),
    ))
}

// src/handlers/auth.rs

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::{
        auth::{AuthResponse, ChangePasswordPayload, LoginUserPayload},
        system::MessageResponse,
    },
};

// POST /api/login
pub async fn login(
    State(app_state): State<AppState>,
    payload: Result<Json<LoginUserPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let access_token = app_state
        .auth_service
        .login_user(&payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse { access_token, username: payload.username }),
    ))
}

// POST /api/update-password
pub async fn update_password(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    payload: Result<Json<ChangePasswordPayload>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(payload) = payload?;
    app_state.auth_service.rotate_password(&user, &payload).await?;

    Ok((
        StatusCode::OK,
        Json(MessageResponse { message: "Password updated successfully" }),
    ))
}

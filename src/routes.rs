// src/routes.rs

use std::any::Any;

use axum::{
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{common::error::AppError, config::AppState, handlers, middleware::auth::auth_guard};

pub fn build_router(app_state: AppState) -> Router {
    // Rotas públicas
    let public_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/health", get(handlers::system::health));

    // Tudo o que exige sessão
    let protected_routes = Router::new()
        .route("/update-password", post(handlers::auth::update_password))
        .route(
            "/labor-rate",
            get(handlers::labor_rate::get_labor_rate).put(handlers::labor_rate::update_labor_rate),
        )
        .route(
            "/receipts",
            get(handlers::receipts::list_receipts).post(handlers::receipts::create_receipt),
        )
        .route("/receipts/{id}", delete(handlers::receipts::delete_receipt))
        .route("/summary", get(handlers::summary::daily_summary))
        .route("/monthly-summary", get(handlers::summary::monthly_summary))
        .route("/export", get(handlers::summary::export_receipts))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    Router::new()
        .nest("/api", public_routes.merge(protected_routes))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// Pânico num handler vira 500 com o mesmo corpo JSON dos outros erros.
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    AppError::InternalServerError(anyhow::anyhow!("handler panicked: {}", detail)).into_response()
}

// src/models/labor_rate.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A taxa efetiva (linha única da tabela `labor_rates`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct LaborRate {
    pub rate_per_kg: Decimal,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateLaborRatePayload {
    #[serde(default)]
    pub rate_per_kg: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct LaborRateResponse {
    pub rate_per_kg: Decimal,
}

#[derive(Debug, Serialize)]
pub struct LaborRateUpdatedResponse {
    pub message: &'static str,
    pub rate_per_kg: Decimal,
}

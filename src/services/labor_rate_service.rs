// src/services/labor_rate_service.rs

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;

use crate::{
    common::{
        error::AppError,
        parse::{decimal_from_json, exceeds_scale, fits_digits, WEIGHT_DIGITS},
    },
    db::LaborRateRepository,
};

#[derive(Clone)]
pub struct LaborRateService {
    repo: Arc<dyn LaborRateRepository>,
}

impl LaborRateService {
    pub fn new(repo: Arc<dyn LaborRateRepository>) -> Self {
        Self { repo }
    }

    /// Taxa atual; 0 quando nunca foi configurada.
    pub async fn get_rate(&self) -> Result<Decimal, AppError> {
        Ok(self
            .repo
            .current()
            .await?
            .map(|r| r.rate_per_kg)
            .unwrap_or(Decimal::ZERO))
    }

    /// Taxa atual, ou `None` se ainda não existe linha.
    pub async fn current_rate(&self) -> Result<Option<Decimal>, AppError> {
        Ok(self.repo.current().await?.map(|r| r.rate_per_kg))
    }

    pub async fn set_rate(&self, raw: Option<&Value>) -> Result<Decimal, AppError> {
        let rate = raw
            .filter(|v| !v.is_null())
            .ok_or_else(|| AppError::invalid("rate_per_kg is required"))
            .and_then(|v| {
                decimal_from_json(v).ok_or_else(|| AppError::invalid("rate_per_kg must be a number"))
            })?;

        let rate = check_rate(rate)?;
        let saved = self.repo.upsert(rate).await?;
        tracing::info!(rate_per_kg = %saved.rate_per_kg, "Labor rate updated");
        Ok(saved.rate_per_kg)
    }

    /// Semeia a taxa padrão no primeiro boot.
    pub async fn ensure_default(&self, default_rate: Decimal) -> Result<Decimal, AppError> {
        let default_rate = check_rate(default_rate)?;
        Ok(self.repo.get_or_create(default_rate).await?.rate_per_kg)
    }
}

// Mesmos limites da coluna NUMERIC(14, 4).
fn check_rate(rate: Decimal) -> Result<Decimal, AppError> {
    if rate < Decimal::ZERO {
        return Err(AppError::invalid("rate_per_kg must not be negative"));
    }
    if exceeds_scale(&rate) {
        return Err(AppError::invalid("rate_per_kg must have at most 4 decimal places"));
    }
    if !fits_digits(&rate, WEIGHT_DIGITS) {
        return Err(AppError::invalid("rate_per_kg is out of range"));
    }
    Ok(rate)
}

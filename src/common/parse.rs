// src/common/parse.rs
//
// Conversões de entrada compartilhadas pelos handlers e serviços.

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use crate::common::error::AppError;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

// Colunas NUMERIC(14, 4) e NUMERIC(18, 4) do schema.
pub const NUMERIC_SCALE: u32 = 4;
pub const WEIGHT_DIGITS: u32 = 10;
pub const COST_DIGITS: u32 = 14;

// Limites de VARCHAR do schema.
pub const NAME_MAX_CHARS: usize = 100;
pub const DIMENSION_MAX_CHARS: usize = 50;

/// Lê uma data `YYYY-MM-DD`; o erro cita o nome do parâmetro.
pub fn parse_date(field: &str, raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
        .map_err(|_| AppError::invalid(format!("Invalid {}, expected YYYY-MM-DD", field)))
}

/// Converte um valor JSON (número ou texto numérico) em Decimal.
pub fn decimal_from_json(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => decimal_from_str(&n.to_string()),
        Value::String(s) => decimal_from_str(s.trim()),
        _ => None,
    }
}

fn decimal_from_str(raw: &str) -> Option<Decimal> {
    if raw.is_empty() {
        return None;
    }
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

/// Campos de texto opcionais: vazio ou só espaços conta como ausente.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Mais casas decimais do que a coluna guarda?
pub fn exceeds_scale(value: &Decimal) -> bool {
    value.normalize().scale() > NUMERIC_SCALE
}

/// Cabe na parte inteira de uma coluna com `digits` dígitos antes da vírgula.
pub fn fits_digits(value: &Decimal, digits: u32) -> bool {
    value.abs() < Decimal::from(10_i64.pow(digits))
}

/// Arredonda para a escala da coluna, como o Postgres faria.
pub fn round_to_column(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(NUMERIC_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Texto opcional com limite de caracteres do VARCHAR.
pub fn check_length(field: &str, value: Option<&str>, max_chars: usize) -> Result<(), AppError> {
    match value {
        Some(v) if v.chars().count() > max_chars => Err(AppError::invalid(format!(
            "{} must be at most {} characters",
            field, max_chars
        ))),
        _ => Ok(()),
    }
}

// src/models/summary.rs

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Deserialize)]
pub struct DailySummaryQuery {
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlySummaryQuery {
    pub year: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_receipts: usize,
    pub total_weight: Decimal,
    pub total_labor_cost: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_receipts: usize,
    pub total_weight: Decimal,
    pub total_labor_cost: Decimal,
    // Chave: data ISO (YYYY-MM-DD)
    pub daily_breakdown: BTreeMap<String, DayBreakdown>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DayBreakdown {
    pub receipts: usize,
    pub weight: Decimal,
    pub labor_cost: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub content: String,
    pub total_records: usize,
}

// src/models/receipt.rs

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::common::{error::AppError, parse::parse_date};

// --- Agregado: Recibo + Itens ---

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Receipt {
    pub id: i64,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub total_weight: Decimal,
    pub total_labor_cost: Decimal,
    pub created_at: DateTime<Utc>,

    // Carregados numa segunda consulta, na ordem de criação
    #[sqlx(skip)]
    pub items: Vec<ReceiptItem>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ReceiptItem {
    pub id: i64,
    #[serde(skip_serializing)]
    pub receipt_id: i64,
    pub item_name: String,
    pub weight_kg: Decimal,
    pub dimension: Option<String>,
    pub labor_cost: Decimal,
}

/// Recibo já validado e precificado, pronto para ser gravado.
#[derive(Debug, Clone, PartialEq)]
pub struct NewReceipt {
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub total_weight: Decimal,
    pub total_labor_cost: Decimal,
    pub items: Vec<NewReceiptItem>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReceiptItem {
    pub item_name: String,
    pub weight_kg: Decimal,
    pub dimension: Option<String>,
    pub labor_cost: Decimal,
}

// --- Payloads ---

// Qualquer "date"/"time" enviado pelo cliente é ignorado.
#[derive(Debug, Deserialize)]
pub struct CreateReceiptPayload {
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<ReceiptItemPayload>,
}

#[derive(Debug, Deserialize)]
pub struct ReceiptItemPayload {
    pub item_name: Option<String>,
    // Aceita número ou texto numérico
    pub weight_kg: Option<serde_json::Value>,
    pub dimension: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReceiptCreatedResponse {
    pub message: &'static str,
    pub receipt_id: i64,
}

// --- Filtros de listagem/exportação ---

/// Parâmetros crus da query string (`GET /receipts`, `GET /export`).
#[derive(Debug, Default, Deserialize)]
pub struct ReceiptQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub date: Option<String>,
    pub customer: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateScope {
    All,
    Day(NaiveDate),
    Range { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    LaborCost,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptFilter {
    pub scope: DateScope,
    pub customer: Option<String>,
    pub sort_by: SortKey,
    pub direction: SortDirection,
}

impl Default for ReceiptFilter {
    fn default() -> Self {
        Self {
            scope: DateScope::All,
            customer: None,
            sort_by: SortKey::default(),
            direction: SortDirection::default(),
        }
    }
}

impl ReceiptFilter {
    pub fn for_day(date: NaiveDate) -> Self {
        Self { scope: DateScope::Day(date), ..Self::default() }
    }

    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self { scope: DateScope::Range { start, end }, ..Self::default() }
    }
}

impl TryFrom<ReceiptQuery> for ReceiptFilter {
    type Error = AppError;

    fn try_from(q: ReceiptQuery) -> Result<Self, Self::Error> {
        let present = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

        // Intervalo tem prioridade; "date" sozinho é o caminho legado.
        let scope = match (present(&q.start_date), present(&q.end_date), present(&q.date)) {
            (Some(start), Some(end), _) => DateScope::Range {
                start: parse_date("start_date", &start)?,
                end: parse_date("end_date", &end)?,
            },
            (_, _, Some(day)) => DateScope::Day(parse_date("date", &day)?),
            _ => DateScope::All,
        };

        let sort_by = match present(&q.sort_by).as_deref() {
            Some("labor_cost") => SortKey::LaborCost,
            _ => SortKey::Date,
        };
        let direction = match present(&q.sort_order).as_deref() {
            Some("asc") => SortDirection::Asc,
            _ => SortDirection::Desc,
        };

        Ok(Self {
            scope,
            customer: present(&q.customer),
            sort_by,
            direction,
        })
    }
}

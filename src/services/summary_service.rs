// src/services/summary_service.rs

use std::{collections::BTreeMap, sync::Arc};

use chrono::{Datelike, NaiveDate};

use crate::{
    common::{
        clock::Clock,
        error::AppError,
        parse::{parse_date, DATE_FORMAT},
    },
    models::{
        receipt::{Receipt, ReceiptFilter},
        summary::{DailySummary, DayBreakdown, MonthlySummary},
    },
    services::receipt_service::ReceiptService,
};

#[derive(Clone)]
pub struct SummaryService {
    receipts: ReceiptService,
    clock: Arc<dyn Clock>,
}

impl DayBreakdown {
    fn add(&mut self, receipt: &Receipt) {
        self.receipts += 1;
        self.weight += receipt.total_weight;
        self.labor_cost += receipt.total_labor_cost;
    }
}

/// Soma linear de um conjunto já materializado.
fn fold<'a>(receipts: impl IntoIterator<Item = &'a Receipt>) -> DayBreakdown {
    receipts.into_iter().fold(DayBreakdown::default(), |mut acc, r| {
        acc.add(r);
        acc
    })
}

/// Primeiro e último dia do mês; o último é "dia 1 do mês seguinte menos um".
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate), AppError> {
    if !(1..=12).contains(&month) {
        return Err(AppError::invalid("month must be between 1 and 12"));
    }
    let out_of_range = || AppError::invalid("year is out of range");

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)?;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(out_of_range)?;

    Ok((first, last))
}

impl SummaryService {
    pub fn new(receipts: ReceiptService, clock: Arc<dyn Clock>) -> Self {
        Self { receipts, clock }
    }

    pub async fn daily_summary(&self, date: Option<&str>) -> Result<DailySummary, AppError> {
        let target = match date.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => parse_date("date", raw)?,
            None => self.clock.now().date(),
        };

        let receipts = self.receipts.list_receipts(&ReceiptFilter::for_day(target)).await?;
        let totals = fold(&receipts);

        Ok(DailySummary {
            date: target,
            total_receipts: totals.receipts,
            total_weight: totals.weight,
            total_labor_cost: totals.labor_cost,
        })
    }

    pub async fn monthly_summary(&self, year: Option<&str>, month: Option<&str>) -> Result<MonthlySummary, AppError> {
        let today = self.clock.now().date();

        let year = match year.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<i32>()
                .map_err(|_| AppError::invalid("year must be an integer"))?,
            None => today.year(),
        };
        let month = match month.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|_| AppError::invalid("month must be between 1 and 12"))?,
            None => today.month(),
        };

        let (first, last) = month_bounds(year, month)?;
        let receipts = self
            .receipts
            .list_receipts(&ReceiptFilter::for_range(first, last))
            .await?;

        let totals = fold(&receipts);
        let mut daily_breakdown: BTreeMap<String, DayBreakdown> = BTreeMap::new();
        for receipt in &receipts {
            daily_breakdown
                .entry(receipt.date.format(DATE_FORMAT).to_string())
                .or_default()
                .add(receipt);
        }

        Ok(MonthlySummary {
            year,
            month,
            total_receipts: totals.receipts,
            total_weight: totals.weight,
            total_labor_cost: totals.labor_cost,
            daily_breakdown,
        })
    }
}

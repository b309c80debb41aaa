// src/services/receipt_service.rs

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;

use crate::{
    common::{
        clock::Clock,
        error::AppError,
        parse::{
            check_length, decimal_from_json, exceeds_scale, fits_digits, non_blank, round_to_column,
            COST_DIGITS, DIMENSION_MAX_CHARS, NAME_MAX_CHARS, WEIGHT_DIGITS,
        },
    },
    db::ReceiptRepository,
    models::receipt::{
        CreateReceiptPayload, NewReceipt, NewReceiptItem, Receipt, ReceiptFilter, ReceiptItemPayload,
    },
    services::labor_rate_service::LaborRateService,
};

#[derive(Clone)]
pub struct ReceiptService {
    repo: Arc<dyn ReceiptRepository>,
    labor_rates: LaborRateService,
    clock: Arc<dyn Clock>,
}

// Item já validado, ainda sem custo.
struct ItemLine {
    item_name: String,
    weight_kg: Decimal,
    dimension: Option<String>,
}

impl ReceiptService {
    pub fn new(repo: Arc<dyn ReceiptRepository>, labor_rates: LaborRateService, clock: Arc<dyn Clock>) -> Self {
        Self { repo, labor_rates, clock }
    }

    pub async fn create_receipt(&self, payload: CreateReceiptPayload) -> Result<Receipt, AppError> {
        if payload.items.is_empty() {
            return Err(AppError::invalid("At least one item required"));
        }

        let customer_name = non_blank(payload.customer_name);
        check_length("customer_name", customer_name.as_deref(), NAME_MAX_CHARS)?;

        // A taxa é lida uma única vez e congelada nos itens.
        let rate = self
            .labor_rates
            .current_rate()
            .await?
            .ok_or_else(|| AppError::invalid("Labor rate not configured"))?;

        let lines = validate_items(&payload.items)?;
        let new_receipt = price_receipt(
            customer_name,
            non_blank(payload.notes),
            lines,
            rate,
            self.clock.now(),
        )?;

        let receipt = self.repo.create(&new_receipt).await?;
        tracing::info!(
            receipt_id = receipt.id,
            items = receipt.items.len(),
            total_labor_cost = %receipt.total_labor_cost,
            "Receipt created"
        );
        Ok(receipt)
    }

    pub async fn list_receipts(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, AppError> {
        self.repo.list(filter).await
    }

    pub async fn delete_receipt(&self, id: i64) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::NotFound("Receipt"));
        }
        tracing::info!(receipt_id = id, "Receipt deleted");
        Ok(())
    }
}

fn validate_items(items: &[ReceiptItemPayload]) -> Result<Vec<ItemLine>, AppError> {
    items
        .iter()
        .enumerate()
        .map(|(idx, item)| {
            let item_name = non_blank(item.item_name.clone())
                .ok_or_else(|| AppError::invalid(format!("items[{idx}].item_name is required")))?;
            check_length(&format!("items[{idx}].item_name"), Some(item_name.as_str()), NAME_MAX_CHARS)?;

            let raw_weight = item
                .weight_kg
                .as_ref()
                .filter(|v| !v.is_null())
                .ok_or_else(|| AppError::invalid(format!("items[{idx}].weight_kg is required")))?;

            let weight_kg = decimal_from_json(raw_weight)
                .filter(|w| *w > Decimal::ZERO)
                .ok_or_else(|| {
                    AppError::invalid(format!("items[{idx}].weight_kg must be a positive number"))
                })?;
            if exceeds_scale(&weight_kg) {
                return Err(AppError::invalid(format!(
                    "items[{idx}].weight_kg must have at most 4 decimal places"
                )));
            }
            if !fits_digits(&weight_kg, WEIGHT_DIGITS) {
                return Err(out_of_range(idx));
            }

            let dimension = non_blank(item.dimension.clone());
            check_length(&format!("items[{idx}].dimension"), dimension.as_deref(), DIMENSION_MAX_CHARS)?;

            Ok(ItemLine {
                item_name,
                weight_kg,
                dimension,
            })
        })
        .collect()
}

fn out_of_range(idx: usize) -> AppError {
    AppError::invalid(format!("items[{idx}].weight_kg is out of range"))
}

/// Calcula custo por item e totais; data/hora vêm do relógio do servidor.
/// Cada custo é arredondado para a escala da coluna antes de entrar na soma,
/// então o total gravado é exatamente a soma dos itens gravados.
fn price_receipt(
    customer_name: Option<String>,
    notes: Option<String>,
    lines: Vec<ItemLine>,
    rate_per_kg: Decimal,
    now: NaiveDateTime,
) -> Result<NewReceipt, AppError> {
    let mut total_weight = Decimal::ZERO;
    let mut total_labor_cost = Decimal::ZERO;
    let mut items = Vec::with_capacity(lines.len());

    for (idx, line) in lines.into_iter().enumerate() {
        let labor_cost = line
            .weight_kg
            .checked_mul(rate_per_kg)
            .map(round_to_column)
            .filter(|c| fits_digits(c, COST_DIGITS))
            .ok_or_else(|| out_of_range(idx))?;

        total_weight = total_weight
            .checked_add(line.weight_kg)
            .filter(|w| fits_digits(w, WEIGHT_DIGITS))
            .ok_or_else(|| AppError::invalid("total_weight is out of range"))?;
        total_labor_cost = total_labor_cost
            .checked_add(labor_cost)
            .filter(|c| fits_digits(c, COST_DIGITS))
            .ok_or_else(|| AppError::invalid("total_labor_cost is out of range"))?;

        items.push(NewReceiptItem {
            item_name: line.item_name,
            weight_kg: line.weight_kg,
            dimension: line.dimension,
            labor_cost,
        });
    }

    Ok(NewReceipt {
        customer_name,
        notes,
        date: now.date(),
        time: now.time(),
        total_weight,
        total_labor_cost,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::clock::FixedClock,
        db::memory::MemoryStore,
        models::receipt::{ReceiptQuery, SortKey, SortDirection},
    };
    use chrono::NaiveDate;
    use serde_json::json;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        clock: Arc<FixedClock>,
        rates: LaborRateService,
        service: ReceiptService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::at("2024-01-15 10:30:00"));
        let rates = LaborRateService::new(store.clone());
        let service = ReceiptService::new(store.clone(), rates.clone(), clock.clone());
        Fixture { store, clock, rates, service }
    }

    fn payload(value: serde_json::Value) -> CreateReceiptPayload {
        serde_json::from_value(value).unwrap()
    }

    async fn create_for(f: &Fixture, customer: &str, weight: f64) -> Receipt {
        f.service
            .create_receipt(payload(json!({
                "customer_name": customer,
                "items": [{ "item_name": "Bar", "weight_kg": weight }]
            })))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn totals_are_sums_of_weights_and_costs() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10.0))).await.unwrap();

        let receipt = f
            .service
            .create_receipt(payload(json!({
                "items": [
                    { "item_name": "Rod", "weight_kg": 5 },
                    { "item_name": "Sheet", "weight_kg": 3, "dimension": "8x8 feet" }
                ]
            })))
            .await
            .unwrap();

        assert_eq!(receipt.total_weight, d("8"));
        assert_eq!(receipt.total_labor_cost, d("80.0"));
        let costs: Vec<Decimal> = receipt.items.iter().map(|i| i.labor_cost).collect();
        assert_eq!(costs, vec![d("50.0"), d("30.0")]);
        assert_eq!(receipt.items[1].dimension.as_deref(), Some("8x8 feet"));
        assert_eq!(f.store.item_count(), 2);
    }

    #[tokio::test]
    async fn fractional_weights_sum_exactly() {
        let f = fixture();
        f.rates.set_rate(Some(&json!("0.1"))).await.unwrap();

        let receipt = f
            .service
            .create_receipt(payload(json!({
                "items": [
                    { "item_name": "Wire", "weight_kg": 0.1 },
                    { "item_name": "Wire", "weight_kg": "0.2" }
                ]
            })))
            .await
            .unwrap();

        assert_eq!(receipt.total_weight, d("0.3"));
        assert_eq!(receipt.total_labor_cost, d("0.03"));
    }

    #[tokio::test]
    async fn later_rate_changes_do_not_touch_existing_receipts() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        create_for(&f, "Acme", 5.0).await;

        f.rates.set_rate(Some(&json!(20))).await.unwrap();
        create_for(&f, "Acme", 5.0).await;

        let all = f.service.list_receipts(&ReceiptFilter::default()).await.unwrap();
        let mut costs: Vec<Decimal> = all.iter().map(|r| r.total_labor_cost).collect();
        costs.sort();
        assert_eq!(costs, vec![d("50"), d("100")]);
    }

    #[tokio::test]
    async fn zero_items_is_a_validation_error() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        let err = f.service.create_receipt(payload(json!({ "items": [] }))).await.unwrap_err();
        assert_eq!(err.to_string(), "At least one item required");

        let err = f.service.create_receipt(payload(json!({}))).await.unwrap_err();
        assert_eq!(err.to_string(), "At least one item required");
    }

    #[tokio::test]
    async fn missing_rate_is_a_validation_error() {
        let f = fixture();
        let err = f
            .service
            .create_receipt(payload(json!({ "items": [{ "item_name": "Rod", "weight_kg": 1 }] })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Labor rate not configured");
        assert_eq!(f.store.receipt_count(), 0);
    }

    #[tokio::test]
    async fn one_bad_item_persists_nothing() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();

        let cases = [
            (json!({ "weight_kg": 2 }), "items[1].item_name is required"),
            (json!({ "item_name": "  ", "weight_kg": 2 }), "items[1].item_name is required"),
            (json!({ "item_name": "Sheet" }), "items[1].weight_kg is required"),
            (json!({ "item_name": "Sheet", "weight_kg": 0 }), "items[1].weight_kg must be a positive number"),
            (json!({ "item_name": "Sheet", "weight_kg": -3 }), "items[1].weight_kg must be a positive number"),
            (json!({ "item_name": "Sheet", "weight_kg": "lots" }), "items[1].weight_kg must be a positive number"),
            (json!({ "item_name": "Sheet", "weight_kg": "0.00001" }), "items[1].weight_kg must have at most 4 decimal places"),
            (
                json!({ "item_name": "Sheet", "weight_kg": "79228162514264337593543950335" }),
                "items[1].weight_kg is out of range",
            ),
            (json!({ "item_name": "Sheet", "weight_kg": "10000000000" }), "items[1].weight_kg is out of range"),
            (
                json!({ "item_name": "x".repeat(101), "weight_kg": 1 }),
                "items[1].item_name must be at most 100 characters",
            ),
            (
                json!({ "item_name": "Sheet", "weight_kg": 1, "dimension": "9".repeat(51) }),
                "items[1].dimension must be at most 50 characters",
            ),
        ];

        for (bad_item, message) in cases {
            let (receipts_before, items_before) = (f.store.receipt_count(), f.store.item_count());
            let err = f
                .service
                .create_receipt(payload(json!({
                    "items": [{ "item_name": "Rod", "weight_kg": 5 }, bad_item]
                })))
                .await
                .unwrap_err();

            assert!(matches!(err, AppError::InvalidInput(_)));
            assert_eq!(err.to_string(), message);
            assert_eq!(f.store.receipt_count(), receipts_before);
            assert_eq!(f.store.item_count(), items_before);
        }
    }

    #[tokio::test]
    async fn item_costs_are_rounded_before_they_are_summed() {
        let f = fixture();
        f.rates.set_rate(Some(&json!("0.5"))).await.unwrap();

        let receipt = f
            .service
            .create_receipt(payload(json!({
                "items": [
                    { "item_name": "Pin", "weight_kg": "0.0001" },
                    { "item_name": "Pin", "weight_kg": "0.0001" },
                    { "item_name": "Pin", "weight_kg": "0.0001" }
                ]
            })))
            .await
            .unwrap();

        let costs: Vec<Decimal> = receipt.items.iter().map(|i| i.labor_cost).collect();
        assert_eq!(costs, vec![d("0.0001"); 3]);
        assert_eq!(receipt.total_labor_cost, costs.iter().copied().sum::<Decimal>());
        assert_eq!(receipt.total_labor_cost, d("0.0003"));
        for cost in costs.iter().chain([&receipt.total_labor_cost, &receipt.total_weight]) {
            assert!(cost.scale() <= 4);
        }
    }

    #[tokio::test]
    async fn large_but_valid_weights_fit_the_columns() {
        let f = fixture();
        f.rates.set_rate(Some(&json!("9999.9999"))).await.unwrap();

        let receipt = f
            .service
            .create_receipt(payload(json!({
                "items": [{ "item_name": "Ingot", "weight_kg": "9999999999.9999" }]
            })))
            .await
            .unwrap();
        assert_eq!(receipt.total_weight, d("9999999999.9999"));
        assert_eq!(receipt.total_labor_cost, receipt.items[0].labor_cost);

        let err = f
            .service
            .create_receipt(payload(json!({
                "items": [
                    { "item_name": "Ingot", "weight_kg": "9999999999" },
                    { "item_name": "Ingot", "weight_kg": "1" }
                ]
            })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "total_weight is out of range");
    }

    #[tokio::test]
    async fn long_customer_names_are_rejected() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        let err = f
            .service
            .create_receipt(payload(json!({
                "customer_name": "c".repeat(101),
                "items": [{ "item_name": "Rod", "weight_kg": 1 }]
            })))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "customer_name must be at most 100 characters");
        assert_eq!(f.store.receipt_count(), 0);
    }

    #[tokio::test]
    async fn date_and_time_come_from_the_server_clock() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();

        let receipt = f
            .service
            .create_receipt(payload(json!({
                "date": "1999-12-31",
                "time": "23:59:59",
                "customer_name": "  ",
                "items": [{ "item_name": "Rod", "weight_kg": 1 }]
            })))
            .await
            .unwrap();

        assert_eq!(receipt.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(receipt.time.to_string(), "10:30:00");
        assert_eq!(receipt.customer_name, None);
    }

    #[tokio::test]
    async fn delete_removes_receipt_and_items() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        let keep = create_for(&f, "Keep", 1.0).await;
        let gone = f
            .service
            .create_receipt(payload(json!({
                "items": [{ "item_name": "A", "weight_kg": 1 }, { "item_name": "B", "weight_kg": 2 }]
            })))
            .await
            .unwrap();
        assert_eq!(f.store.item_count(), 3);

        f.service.delete_receipt(gone.id).await.unwrap();

        assert_eq!(f.store.item_count(), 1);
        let left = f.service.list_receipts(&ReceiptFilter::default()).await.unwrap();
        assert_eq!(left.iter().map(|r| r.id).collect::<Vec<_>>(), vec![keep.id]);
    }

    #[tokio::test]
    async fn deleting_an_unknown_receipt_is_not_found() {
        let f = fixture();
        let err = f.service.delete_receipt(42).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound("Receipt")));
    }

    #[tokio::test]
    async fn range_filter_is_inclusive_and_sorted_newest_first() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();

        for at in [
            "2023-12-31 23:59:00",
            "2024-01-01 08:00:00",
            "2024-01-15 09:00:00",
            "2024-01-15 17:00:00",
            "2024-01-31 12:00:00",
            "2024-02-01 00:00:00",
        ] {
            f.clock.set(at);
            create_for(&f, "Acme", 1.0).await;
        }

        let filter = ReceiptFilter::try_from(ReceiptQuery {
            start_date: Some("2024-01-01".into()),
            end_date: Some("2024-01-31".into()),
            ..Default::default()
        })
        .unwrap();
        let found = f.service.list_receipts(&filter).await.unwrap();

        let stamps: Vec<String> = found.iter().map(|r| format!("{} {}", r.date, r.time)).collect();
        assert_eq!(
            stamps,
            vec![
                "2024-01-31 12:00:00",
                "2024-01-15 17:00:00",
                "2024-01-15 09:00:00",
                "2024-01-01 08:00:00",
            ]
        );
    }

    #[tokio::test]
    async fn customer_filter_is_a_case_insensitive_substring() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        create_for(&f, "ACME Steel", 1.0).await;
        create_for(&f, "Bolt & Nut", 1.0).await;
        f.service
            .create_receipt(payload(json!({ "items": [{ "item_name": "Rod", "weight_kg": 1 }] })))
            .await
            .unwrap();

        let filter = ReceiptFilter { customer: Some("acme".into()), ..Default::default() };
        let found = f.service.list_receipts(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].customer_name.as_deref(), Some("ACME Steel"));
    }

    #[tokio::test]
    async fn labor_cost_sort_honours_direction() {
        let f = fixture();
        f.rates.set_rate(Some(&json!(10))).await.unwrap();
        for weight in [3.0, 1.0, 2.0] {
            create_for(&f, "Acme", weight).await;
        }

        let filter = ReceiptFilter {
            sort_by: SortKey::LaborCost,
            direction: SortDirection::Asc,
            ..Default::default()
        };
        let found = f.service.list_receipts(&filter).await.unwrap();
        let costs: Vec<Decimal> = found.iter().map(|r| r.total_labor_cost).collect();
        assert_eq!(costs, vec![d("10"), d("20"), d("30")]);
    }
}

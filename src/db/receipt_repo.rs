// src/db/receipt_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use crate::{
    common::error::AppError,
    models::receipt::{
        DateScope, NewReceipt, NewReceiptItem, Receipt, ReceiptFilter, ReceiptItem, SortKey,
    },
};

const RECEIPT_COLUMNS: &str =
    "id, customer_name, notes, date, time, total_weight, total_labor_cost, created_at";
const ITEM_COLUMNS: &str = "id, receipt_id, item_name, weight_kg, dimension, labor_cost";

/// O recibo é a raiz do agregado: itens entram e saem junto com ele.
#[async_trait]
pub trait ReceiptRepository: Send + Sync {
    /// Grava recibo + itens numa única transação.
    async fn create(&self, receipt: &NewReceipt) -> Result<Receipt, AppError>;

    /// Filtra e ordena; cada recibo volta com seus itens.
    async fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, AppError>;

    /// `false` quando o id não existe.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgReceiptRepository {
    pool: PgPool,
}

impl PgReceiptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_item(
        tx: &mut Transaction<'_, Postgres>,
        receipt_id: i64,
        item: &NewReceiptItem,
    ) -> Result<ReceiptItem, AppError> {
        let query = format!(
            "INSERT INTO receipt_items (receipt_id, item_name, weight_kg, dimension, labor_cost) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {ITEM_COLUMNS}"
        );
        let row = sqlx::query_as::<_, ReceiptItem>(&query)
            .bind(receipt_id)
            .bind(&item.item_name)
            .bind(item.weight_kg)
            .bind(item.dimension.as_deref())
            .bind(item.labor_cost)
            .fetch_one(&mut **tx)
            .await?;
        Ok(row)
    }

    async fn attach_items(&self, receipts: &mut [Receipt]) -> Result<(), AppError> {
        if receipts.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = receipts.iter().map(|r| r.id).collect();

        let query = format!(
            "SELECT {ITEM_COLUMNS} FROM receipt_items \
             WHERE receipt_id = ANY($1) \
             ORDER BY receipt_id, id"
        );
        let items = sqlx::query_as::<_, ReceiptItem>(&query)
            .bind(ids.as_slice())
            .fetch_all(&self.pool)
            .await?;

        let mut by_receipt: HashMap<i64, Vec<ReceiptItem>> = HashMap::new();
        for item in items {
            by_receipt.entry(item.receipt_id).or_default().push(item);
        }
        for receipt in receipts.iter_mut() {
            receipt.items = by_receipt.remove(&receipt.id).unwrap_or_default();
        }
        Ok(())
    }
}

#[async_trait]
impl ReceiptRepository for PgReceiptRepository {
    async fn create(&self, new: &NewReceipt) -> Result<Receipt, AppError> {
        let mut tx = self.pool.begin().await?;

        let query = format!(
            "INSERT INTO receipts (customer_name, notes, date, time, total_weight, total_labor_cost) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {RECEIPT_COLUMNS}"
        );
        let mut receipt = sqlx::query_as::<_, Receipt>(&query)
            .bind(new.customer_name.as_deref())
            .bind(new.notes.as_deref())
            .bind(new.date)
            .bind(new.time)
            .bind(new.total_weight)
            .bind(new.total_labor_cost)
            .fetch_one(&mut *tx)
            .await?;

        // Se algum item falhar, o drop do `tx` desfaz o recibo também.
        for item in &new.items {
            let saved = Self::insert_item(&mut tx, receipt.id, item).await?;
            receipt.items.push(saved);
        }

        tx.commit().await?;
        Ok(receipt)
    }

    async fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, AppError> {
        let mut conditions = Vec::new();
        let mut bind_idx = 1u32;

        match filter.scope {
            DateScope::Range { .. } => {
                conditions.push(format!("date >= ${} AND date <= ${}", bind_idx, bind_idx + 1));
                bind_idx += 2;
            }
            DateScope::Day(_) => {
                conditions.push(format!("date = ${bind_idx}"));
                bind_idx += 1;
            }
            DateScope::All => {}
        }
        if filter.customer.is_some() {
            conditions.push(format!("customer_name ILIKE ${bind_idx}"));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let dir = filter.direction.as_sql();
        let order_clause = match filter.sort_by {
            SortKey::Date => format!("ORDER BY date {dir}, time {dir}, id {dir}"),
            SortKey::LaborCost => format!("ORDER BY total_labor_cost {dir}, id {dir}"),
        };

        let query = format!("SELECT {RECEIPT_COLUMNS} FROM receipts {where_clause} {order_clause}");
        let mut q = sqlx::query_as::<_, Receipt>(&query);

        match filter.scope {
            DateScope::Range { start, end } => q = q.bind(start).bind(end),
            DateScope::Day(day) => q = q.bind(day),
            DateScope::All => {}
        }
        if let Some(ref customer) = filter.customer {
            q = q.bind(contains_pattern(customer));
        }

        let mut receipts = q.fetch_all(&self.pool).await?;
        self.attach_items(&mut receipts).await?;
        Ok(receipts)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        // A FK já tem ON DELETE CASCADE; apagar explicitamente mantém o
        // contrato mesmo num schema sem a cascata.
        sqlx::query("DELETE FROM receipt_items WHERE receipt_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        Ok(true)
    }
}

/// Padrão ILIKE de "contém", escapando os curingas do próprio texto.
fn contains_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

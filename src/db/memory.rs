// src/db/memory.rs
//
// Repositórios em memória para os testes dos serviços e das rotas.
// Mesma semântica de filtro/ordem das consultas SQL.

use std::{cmp::Ordering, sync::Mutex};

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{LaborRateRepository, ReceiptRepository, UserRepository},
    models::{
        auth::User,
        labor_rate::LaborRate,
        receipt::{DateScope, NewReceipt, Receipt, ReceiptFilter, ReceiptItem, SortDirection, SortKey},
    },
};

#[derive(Default)]
struct State {
    users: Vec<User>,
    rate: Option<LaborRate>,
    receipts: Vec<Receipt>,
    next_receipt_id: i64,
    next_item_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn receipt_count(&self) -> usize {
        self.state.lock().unwrap().receipts.len()
    }

    pub fn item_count(&self) -> usize {
        self.state.lock().unwrap().receipts.iter().map(|r| r.items.len()).sum()
    }

    pub fn password_hash_of(&self, username: &str) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.password_hash.clone())
    }
}

fn matches(filter: &ReceiptFilter, receipt: &Receipt) -> bool {
    let in_scope = match filter.scope {
        DateScope::All => true,
        DateScope::Day(day) => receipt.date == day,
        DateScope::Range { start, end } => receipt.date >= start && receipt.date <= end,
    };
    let customer_ok = match &filter.customer {
        None => true,
        Some(needle) => receipt
            .customer_name
            .as_deref()
            .map(|name| name.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    };
    in_scope && customer_ok
}

fn compare(filter: &ReceiptFilter, a: &Receipt, b: &Receipt) -> Ordering {
    let ascending = match filter.sort_by {
        SortKey::Date => a.date.cmp(&b.date).then(a.time.cmp(&b.time)).then(a.id.cmp(&b.id)),
        SortKey::LaborCost => a.total_labor_cost.cmp(&b.total_labor_cost).then(a.id.cmp(&b.id)),
    };
    match filter.direction {
        SortDirection::Asc => ascending,
        SortDirection::Desc => ascending.reverse(),
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let state = self.state.lock().unwrap();
        Ok(state.users.iter().find(|u| u.username == username).cloned())
    }

    async fn has_any_user(&self) -> Result<bool, AppError> {
        Ok(!self.state.lock().unwrap().users.is_empty())
    }

    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().users.push(user.clone());
        Ok(user)
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let mut state = self.state.lock().unwrap();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or(AppError::NotFound("User"))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }
}

#[async_trait]
impl LaborRateRepository for MemoryStore {
    async fn current(&self) -> Result<Option<LaborRate>, AppError> {
        Ok(self.state.lock().unwrap().rate.clone())
    }

    async fn upsert(&self, rate_per_kg: Decimal) -> Result<LaborRate, AppError> {
        let rate = LaborRate { rate_per_kg, updated_at: Utc::now() };
        self.state.lock().unwrap().rate = Some(rate.clone());
        Ok(rate)
    }

    async fn get_or_create(&self, default_rate: Decimal) -> Result<LaborRate, AppError> {
        let mut state = self.state.lock().unwrap();
        let rate = state
            .rate
            .get_or_insert_with(|| LaborRate { rate_per_kg: default_rate, updated_at: Utc::now() });
        Ok(rate.clone())
    }
}

#[async_trait]
impl ReceiptRepository for MemoryStore {
    async fn create(&self, new: &NewReceipt) -> Result<Receipt, AppError> {
        let mut state = self.state.lock().unwrap();
        state.next_receipt_id += 1;
        let receipt_id = state.next_receipt_id;

        let mut items = Vec::with_capacity(new.items.len());
        for item in &new.items {
            state.next_item_id += 1;
            items.push(ReceiptItem {
                id: state.next_item_id,
                receipt_id,
                item_name: item.item_name.clone(),
                weight_kg: item.weight_kg,
                dimension: item.dimension.clone(),
                labor_cost: item.labor_cost,
            });
        }

        let receipt = Receipt {
            id: receipt_id,
            customer_name: new.customer_name.clone(),
            notes: new.notes.clone(),
            date: new.date,
            time: new.time,
            total_weight: new.total_weight,
            total_labor_cost: new.total_labor_cost,
            created_at: Utc::now(),
            items,
        };
        state.receipts.push(receipt.clone());
        Ok(receipt)
    }

    async fn list(&self, filter: &ReceiptFilter) -> Result<Vec<Receipt>, AppError> {
        let state = self.state.lock().unwrap();
        let mut found: Vec<Receipt> = state
            .receipts
            .iter()
            .filter(|r| matches(filter, r))
            .cloned()
            .collect();
        found.sort_by(|a, b| compare(filter, a, b));
        Ok(found)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut state = self.state.lock().unwrap();
        let before = state.receipts.len();
        state.receipts.retain(|r| r.id != id);
        Ok(state.receipts.len() != before)
    }
}

// src/db/labor_rate_repo.rs

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::{common::error::AppError, models::labor_rate::LaborRate};

/// Registro singleton da taxa por kg. A tabela tem chave fixa (id = 1),
/// então "atualizar" e "criar na primeira escrita" são o mesmo UPSERT.
#[async_trait]
pub trait LaborRateRepository: Send + Sync {
    async fn current(&self) -> Result<Option<LaborRate>, AppError>;

    async fn upsert(&self, rate_per_kg: Decimal) -> Result<LaborRate, AppError>;

    /// Cria a linha com `default_rate` só se ela ainda não existir.
    async fn get_or_create(&self, default_rate: Decimal) -> Result<LaborRate, AppError>;
}

#[derive(Clone)]
pub struct PgLaborRateRepository {
    pool: PgPool,
}

impl PgLaborRateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LaborRateRepository for PgLaborRateRepository {
    async fn current(&self) -> Result<Option<LaborRate>, AppError> {
        let rate = sqlx::query_as::<_, LaborRate>(
            "SELECT rate_per_kg, updated_at FROM labor_rates WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(rate)
    }

    async fn upsert(&self, rate_per_kg: Decimal) -> Result<LaborRate, AppError> {
        let rate = sqlx::query_as::<_, LaborRate>(
            r#"
            INSERT INTO labor_rates (id, rate_per_kg)
            VALUES (1, $1)
            ON CONFLICT (id)
            DO UPDATE SET
                rate_per_kg = EXCLUDED.rate_per_kg,
                updated_at = NOW()
            RETURNING rate_per_kg, updated_at
            "#,
        )
        .bind(rate_per_kg)
        .fetch_one(&self.pool)
        .await?;
        Ok(rate)
    }

    async fn get_or_create(&self, default_rate: Decimal) -> Result<LaborRate, AppError> {
        // Uma única instrução: o SELECT não enxerga a linha recém-inserida,
        // então sempre sai exatamente uma linha.
        let rate = sqlx::query_as::<_, LaborRate>(
            r#"
            WITH inserted AS (
                INSERT INTO labor_rates (id, rate_per_kg)
                VALUES (1, $1)
                ON CONFLICT (id) DO NOTHING
                RETURNING rate_per_kg, updated_at
            )
            SELECT rate_per_kg, updated_at FROM inserted
            UNION ALL
            SELECT rate_per_kg, updated_at FROM labor_rates WHERE id = 1
            LIMIT 1
            "#,
        )
        .bind(default_rate)
        .fetch_one(&self.pool)
        .await?;
        Ok(rate)
    }
}

// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    common::clock::{Clock, SystemClock},
    db::{
        LaborRateRepository, PgLaborRateRepository, PgReceiptRepository, PgUserRepository,
        ReceiptRepository, UserRepository,
    },
    services::{
        auth::AuthService, export_service::ExportService, labor_rate_service::LaborRateService,
        receipt_service::ReceiptService, summary_service::SummaryService,
    },
};

/// Configuração lida do ambiente (e do `.env`, se existir).
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub app_addr: String,
    pub admin_username: String,
    pub admin_password: String,
    pub default_labor_rate: Decimal,
    pub bcrypt_cost: u32,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            db_max_connections: env_or("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_ttl_hours: env_or("JWT_TTL_HOURS", 24)?,
            app_addr: env_or("APP_ADDR", "0.0.0.0:5000".to_string())?,
            admin_username: env_or("ADMIN_USERNAME", "admin".to_string())?,
            admin_password: env_or("ADMIN_PASSWORD", "admin123".to_string())?,
            default_labor_rate: env_or("DEFAULT_LABOR_RATE", Decimal::new(10, 0))?,
            bcrypt_cost: env_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
        })
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{} has an invalid value: {}", key, e)),
        Err(_) => Ok(default),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub labor_rate_service: LaborRateService,
    pub receipt_service: ReceiptService,
    pub summary_service: SummaryService,
    pub export_service: ExportService,
}

impl AppState {
    /// Conecta ao Postgres e monta o grafo de dependências.
    pub async fn new(settings: &Settings) -> anyhow::Result<(Self, PgPool)> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("connect to database")?;

        tracing::info!("Database connection established");

        let state = Self::from_parts(
            Arc::new(PgUserRepository::new(db_pool.clone())),
            Arc::new(PgLaborRateRepository::new(db_pool.clone())),
            Arc::new(PgReceiptRepository::new(db_pool.clone())),
            Arc::new(SystemClock),
            settings,
        );
        Ok((state, db_pool))
    }

    pub fn from_parts(
        users: Arc<dyn UserRepository>,
        labor_rates: Arc<dyn LaborRateRepository>,
        receipts: Arc<dyn ReceiptRepository>,
        clock: Arc<dyn Clock>,
        settings: &Settings,
    ) -> Self {
        let auth_service = AuthService::new(
            users,
            settings.jwt_secret.clone(),
            chrono::Duration::hours(settings.jwt_ttl_hours),
            settings.bcrypt_cost,
        );
        let labor_rate_service = LaborRateService::new(labor_rates);
        let receipt_service = ReceiptService::new(receipts, labor_rate_service.clone(), clock.clone());
        let summary_service = SummaryService::new(receipt_service.clone(), clock);
        let export_service = ExportService::new(receipt_service.clone());

        Self {
            auth_service,
            labor_rate_service,
            receipt_service,
            summary_service,
            export_service,
        }
    }

    /// Operador padrão e taxa padrão, só quando ainda não existem.
    pub async fn bootstrap(&self, settings: &Settings) -> anyhow::Result<()> {
        let created = self
            .auth_service
            .ensure_default_user(&settings.admin_username, &settings.admin_password)
            .await?;
        if created && settings.admin_password == "admin123" {
            tracing::warn!(
                username = %settings.admin_username,
                "Default user seeded with the default password; change it with /api/update-password"
            );
        }

        let rate = self
            .labor_rate_service
            .ensure_default(settings.default_labor_rate)
            .await?;
        tracing::info!(rate_per_kg = %rate, "Labor rate ready");
        Ok(())
    }
}

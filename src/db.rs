pub mod labor_rate_repo;
pub mod receipt_repo;
pub mod user_repo;

#[cfg(test)]
pub mod memory;

pub use labor_rate_repo::{LaborRateRepository, PgLaborRateRepository};
pub use receipt_repo::{PgReceiptRepository, ReceiptRepository};
pub use user_repo::{PgUserRepository, UserRepository};

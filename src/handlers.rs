pub mod auth;
pub mod labor_rate;
pub mod receipts;
pub mod summary;
pub mod system;

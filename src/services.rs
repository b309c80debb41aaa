pub mod auth;
pub mod export_service;
pub mod labor_rate_service;
pub mod receipt_service;
pub mod summary_service;

pub mod auth;
pub mod labor_rate;
pub mod receipt;
pub mod summary;
pub mod system;

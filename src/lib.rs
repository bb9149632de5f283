//! fx-notifier - daily KRW exchange rate reports and buy-signal alerts

pub mod config;
pub mod error;
pub mod services;
pub mod sources;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::*;

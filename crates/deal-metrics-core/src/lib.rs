pub mod aggregate;
pub mod deal;
pub mod error;
pub mod line_item;
pub mod numeric;
pub mod shaping;
pub mod term;
pub mod types;

#[cfg(feature = "health")]
pub mod health;

#[cfg(feature = "cash_flow")]
pub mod cash_flow;

#[cfg(feature = "comparison")]
pub mod comparison;

#[cfg(all(feature = "health", feature = "cash_flow", feature = "comparison"))]
pub mod analysis;

pub use error::DealMetricsError;
pub use types::*;

/// Standard result type for deal-metrics operations
pub type DealMetricsResult<T> = Result<T, DealMetricsError>;

//! Shared record types and provider wire formats.

pub mod chart;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One day's OHLCV record for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

/// A normalized series as produced by one provider.
#[derive(Debug, Clone)]
pub struct ProviderSeries {
    /// Short provider name, used for logging.
    pub provider: &'static str,
    pub data: Vec<PriceBar>,
}

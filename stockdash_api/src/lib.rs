//! Upstream historical-price providers for the stock dashboard.
//!
//! Two independent sources sit behind the [`PriceProvider`] trait: a JSON
//! chart API (primary) and a daily-bars CSV endpoint (secondary). Both map
//! their native payloads into the shared [`PriceBar`] record.

mod chart;
mod daily_csv;
mod errors;
mod provider;
mod range;
pub mod types;

pub use self::chart::ChartClient;
pub use self::daily_csv::CsvClient;
pub use self::errors::ProviderError;
pub use self::provider::{PriceProvider, ProviderFuture};
pub use self::range::{range_to_days, Range, DEFAULT_RANGE_DAYS};
pub use self::types::{PriceBar, ProviderSeries};

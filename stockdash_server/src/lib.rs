//! HTTP surface for the stock dashboard: configuration, error mapping and
//! the axum router. The binary in `main.rs` wires these to a listener.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use stockdash_lib::stockdash_api::{ChartClient, CsvClient};
use stockdash_lib::sample::DEFAULT_SAMPLE_SYMBOL;
use stockdash_lib::{Dashboard, Fetcher, SampleStore, Store};

pub use config::Config;
pub use error::ApiError;
pub use routes::app;

/// Build the dashboard around an initialized store, with both providers
/// pointed at the given base URLs.
pub fn build_dashboard(
    store: Arc<Store>,
    chart_base_url: &str,
    csv_base_url: &str,
    sample_dir: &std::path::Path,
    timeout: Duration,
) -> anyhow::Result<Dashboard> {
    let fetcher = Fetcher::new(
        Box::new(ChartClient::with_base_url(chart_base_url, timeout)?),
        Box::new(CsvClient::with_base_url(csv_base_url, timeout)?),
    );
    let samples = SampleStore::new(sample_dir, DEFAULT_SAMPLE_SYMBOL);
    Ok(Dashboard::new(store, fetcher, samples)?)
}

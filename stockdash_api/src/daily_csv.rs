//! Secondary provider: daily bars served as CSV, keyed by lower-cased symbol.
//!
//! Used when the chart API fails or returns nothing. The endpoint always
//! returns the full daily history; the range window is applied locally by
//! keeping only the trailing rows.

use std::time::Duration;

use chrono::NaiveDate;
use url::Url;

use crate::chart::truncate_body;
use crate::provider::{PriceProvider, ProviderFuture};
use crate::range::range_to_days;
use crate::types::{PriceBar, ProviderSeries};
use crate::ProviderError;

const PROVIDER: &str = "csv";
const DEFAULT_BASE_URL: &str = "https://stooq.com";
const EXPECTED_HEADER: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];

/// Client for the daily-bars CSV endpoint.
pub struct CsvClient {
    client: reqwest::Client,
    base_url: String,
}

impl CsvClient {
    /// Create a client against the production endpoint.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn csv_url(&self, symbol: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/q/d/l/", self.base_url))?;
        url.query_pairs_mut()
            .append_pair("s", &format!("{}.us", symbol.to_lowercase()))
            .append_pair("i", "d");
        Ok(url)
    }

    /// Fetch the trailing `range` window of daily bars for `symbol`.
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<ProviderSeries, ProviderError> {
        let url = self.csv_url(symbol)?;

        tracing::debug!(symbol, range, "requesting csv history");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let days = usize::try_from(range_to_days(range)).unwrap_or(usize::MAX);
        let data = parse_daily_csv(symbol, &body, days)?;
        Ok(ProviderSeries {
            provider: PROVIDER,
            data,
        })
    }
}

impl PriceProvider for CsvClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a str,
        range: &'a str,
        _interval: &'a str,
    ) -> ProviderFuture<'a> {
        Box::pin(self.get_history(symbol, range))
    }
}

/// Parse a `Date,Open,High,Low,Close,Volume` document and keep the last `days` rows.
pub(crate) fn parse_daily_csv(
    symbol: &str,
    body: &str,
    days: usize,
) -> Result<Vec<PriceBar>, ProviderError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.trim().as_bytes());

    let header = reader.headers().map_err(|e| ProviderError::BadFormat {
        provider: PROVIDER,
        detail: e.to_string(),
    })?;
    let header_ok = header.len() == EXPECTED_HEADER.len()
        && header
            .iter()
            .zip(EXPECTED_HEADER)
            .all(|(got, want)| got.eq_ignore_ascii_case(want));
    if !header_ok {
        return Err(ProviderError::BadFormat {
            provider: PROVIDER,
            detail: format!("header {:?}", header.iter().collect::<Vec<_>>()),
        });
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let Ok(record) = record else { continue };
        let Some(date) = record
            .get(0)
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        else {
            continue;
        };
        let Some(close) = number(record.get(4)) else {
            continue;
        };
        rows.push(PriceBar {
            date,
            open: number(record.get(1)),
            high: number(record.get(2)),
            low: number(record.get(3)),
            close: Some(close),
            volume: number(record.get(5)).map(|v| v.round() as i64),
        });
    }

    let start = rows.len().saturating_sub(days);
    let sliced = rows.split_off(start);
    if sliced.is_empty() {
        return Err(ProviderError::EmptyResult {
            provider: PROVIDER,
            symbol: symbol.to_string(),
        });
    }
    Ok(sliced)
}

fn number(field: Option<&str>) -> Option<f64> {
    field
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

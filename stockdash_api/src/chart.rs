//! Primary provider: the v8 chart JSON API.

use std::time::Duration;

use chrono::{DateTime, Utc};
use url::Url;

use crate::provider::{PriceProvider, ProviderFuture};
use crate::range::range_to_days;
use crate::types::chart::ChartResponse;
use crate::types::{PriceBar, ProviderSeries};
use crate::ProviderError;

const PROVIDER: &str = "chart";
const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Client for the chart API, keyed by symbol, date window, and interval.
pub struct ChartClient {
    client: reqwest::Client,
    base_url: String,
}

impl ChartClient {
    /// Create a client against the production endpoint.
    pub fn new(timeout: Duration) -> Result<Self, ProviderError> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Create a client with a custom base URL (for testing with wiremock).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(
        &self,
        symbol: &str,
        period1: i64,
        period2: i64,
        interval: &str,
    ) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&format!("{}/v8/finance/chart", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::BadFormat {
                provider: PROVIDER,
                detail: format!("base url cannot take a path: {}", self.base_url),
            })?
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", interval);
        Ok(url)
    }

    /// Fetch daily bars for `symbol` covering the approximate `range` window.
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<ProviderSeries, ProviderError> {
        let period2 = Utc::now().timestamp();
        let period1 = period2 - range_to_days(range) * SECONDS_PER_DAY;
        let url = self.chart_url(symbol, period1, period2, interval)?;

        tracing::debug!(symbol, range, interval, "requesting chart history");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: ChartResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::BadFormat {
                provider: PROVIDER,
                detail: format!("{} | body: {}", e, truncate_body(&body)),
            })?;

        let data = parse_chart(symbol, parsed)?;
        Ok(ProviderSeries {
            provider: PROVIDER,
            data,
        })
    }
}

impl PriceProvider for ChartClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    fn fetch<'a>(
        &'a self,
        symbol: &'a str,
        range: &'a str,
        interval: &'a str,
    ) -> ProviderFuture<'a> {
        Box::pin(self.get_history(symbol, range, interval))
    }
}

/// Zip the parallel chart arrays into bars, dropping entries without a close.
pub(crate) fn parse_chart(
    symbol: &str,
    resp: ChartResponse,
) -> Result<Vec<PriceBar>, ProviderError> {
    let result = match (resp.chart.result, resp.chart.error) {
        (_, Some(err)) => {
            return Err(ProviderError::BadFormat {
                provider: PROVIDER,
                detail: format!("{}: {}", err.code, err.description),
            })
        }
        (Some(result), None) => result,
        (None, None) => {
            return Err(ProviderError::BadFormat {
                provider: PROVIDER,
                detail: "empty result with no error".into(),
            })
        }
    };

    let Some(data) = result.into_iter().next() else {
        return Err(ProviderError::EmptyResult {
            provider: PROVIDER,
            symbol: symbol.to_string(),
        });
    };

    let timestamps = data.timestamp.unwrap_or_default();
    let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

    let bars: Vec<PriceBar> = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = quote.close.get(i).copied().flatten()?;
            let date = DateTime::from_timestamp(ts, 0)?.date_naive();
            Some(PriceBar {
                date,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: Some(close),
                volume: quote.volume.get(i).copied().flatten(),
            })
        })
        .collect();

    if bars.is_empty() {
        return Err(ProviderError::EmptyResult {
            provider: PROVIDER,
            symbol: symbol.to_string(),
        });
    }
    Ok(bars)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 500;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn parse(json: serde_json::Value) -> Result<Vec<PriceBar>, ProviderError> {
        parse_chart("AAPL", serde_json::from_value(json).unwrap())
    }

    #[test]
    fn chart_url_layout() {
        let client =
            ChartClient::with_base_url("https://query1.finance.yahoo.com/", Duration::from_secs(1))
                .unwrap();
        let url = client
            .chart_url("AAPL", 1_700_000_000, 1_702_678_400, "1d")
            .unwrap();
        insta::assert_snapshot!(
            url.to_string(),
            @"https://query1.finance.yahoo.com/v8/finance/chart/AAPL?period1=1700000000&period2=1702678400&interval=1d"
        );
    }

    #[test]
    fn zips_parallel_arrays_and_drops_null_close() {
        let bars = parse(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1718400000, 1718659200, 1718745600],
                    "indicators": { "quote": [{
                        "open": [210.0, null, 212.5],
                        "high": [213.0, 214.0, 215.0],
                        "low": [209.0, 210.0, 211.0],
                        "close": [212.0, null, 214.2],
                        "volume": [1000, 2000, null]
                    }]}
                }],
                "error": null
            }
        }))
        .unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 6, 14).unwrap());
        assert_eq!(bars[0].close, Some(212.0));
        assert_eq!(bars[0].volume, Some(1000));
        assert_eq!(bars[1].date, NaiveDate::from_ymd_opt(2024, 6, 18).unwrap());
        assert_eq!(bars[1].open, Some(212.5));
        assert_eq!(bars[1].volume, None);
    }

    #[test]
    fn all_null_closes_is_empty_result() {
        let err = parse(serde_json::json!({
            "chart": {
                "result": [{
                    "timestamp": [1718400000],
                    "indicators": { "quote": [{ "close": [null] }] }
                }],
                "error": null
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { .. }));
    }

    #[test]
    fn missing_timestamps_is_empty_result() {
        let err = parse(serde_json::json!({
            "chart": {
                "result": [{ "indicators": { "quote": [{}] } }],
                "error": null
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::EmptyResult { .. }));
    }

    #[test]
    fn upstream_error_object_is_bad_format() {
        let err = parse(serde_json::json!({
            "chart": {
                "result": null,
                "error": { "code": "Not Found", "description": "No data found, symbol may be delisted" }
            }
        }))
        .unwrap_err();
        assert!(matches!(err, ProviderError::BadFormat { .. }));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let body = "é".repeat(400);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
    }
}

//! Request-level operations: company listing, price series, prediction.
//!
//! [`Dashboard`] owns the fetcher, the store handle, and the sample store,
//! and answers each query by walking the tiers in order. Price series never
//! fail outright; they degrade to cached data, then sample data, then an
//! empty series.

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use stockdash_api::{PriceBar, Range};
use tokio::task::JoinError;

use crate::analysis::{closes, predict_window, week52_stats, Week52Stats};
use crate::error::PredictError;
use crate::fallback::{first_success, Tier, TierFailure};
use crate::fetcher::Fetcher;
use crate::sample::{Sample, SampleError, SampleStore};
use crate::store::{Company, Store, StoreError};

const STATS_RANGE: Range = Range::OneYear;
const PREDICTION_RANGE: Range = Range::OneMonth;
const DAILY: &str = "1d";

/// Response body for a price request.
#[derive(Debug, Clone, Serialize)]
pub struct PriceSeries {
    pub symbol: String,
    pub range: String,
    pub interval: String,
    pub data: Vec<PriceBar>,
    /// `None` serializes as `{}` (cache, sample, or empty results).
    #[serde(serialize_with = "stats_or_empty")]
    pub stats: Option<Week52Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<Tier>,
}

fn stats_or_empty<S: Serializer>(stats: &Option<Week52Stats>, s: S) -> Result<S::Ok, S::Error> {
    match stats {
        Some(stats) => stats.serialize(s),
        None => s.serialize_map(Some(0))?.end(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub symbol: String,
    pub lookback: usize,
    pub predicted_close: f64,
    pub std: f64,
}

/// Where prediction closes were taken from.
#[derive(Debug, Clone, Copy)]
enum CloseSource {
    Live,
    Cache,
    Sample,
}

impl fmt::Display for CloseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CloseSource::Live => "live",
            CloseSource::Cache => "cache",
            CloseSource::Sample => "sample",
        })
    }
}

pub struct Dashboard {
    store: Arc<Store>,
    fetcher: Fetcher,
    samples: Arc<SampleStore>,
}

/// Run synchronous SQLite or filesystem work on the blocking pool.
async fn run_blocking<T, E, F>(work: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: From<JoinError> + Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

impl Dashboard {
    /// Wire the service together. The store must already be initialized.
    pub fn new(
        store: Arc<Store>,
        fetcher: Fetcher,
        samples: SampleStore,
    ) -> Result<Self, StoreError> {
        if !store.is_initialized() {
            return Err(StoreError::Uninitialized);
        }
        Ok(Self {
            store,
            fetcher,
            samples: Arc::new(samples),
        })
    }

    pub async fn companies(&self) -> Result<Vec<Company>, StoreError> {
        let store = Arc::clone(&self.store);
        run_blocking(move || store.list_companies()).await
    }

    async fn cache_prices(&self, symbol: &str, bars: &[PriceBar]) -> Result<usize, StoreError> {
        let store = Arc::clone(&self.store);
        let (symbol, bars) = (symbol.to_string(), bars.to_vec());
        run_blocking(move || store.upsert_prices(&symbol, &bars)).await
    }

    async fn cached_prices(&self, symbol: &str) -> Result<Vec<PriceBar>, StoreError> {
        let store = Arc::clone(&self.store);
        let symbol = symbol.to_string();
        run_blocking(move || store.read_prices(&symbol)).await
    }

    async fn cached_closes(&self, symbol: &str) -> Result<Vec<f64>, StoreError> {
        let store = Arc::clone(&self.store);
        let symbol = symbol.to_string();
        run_blocking(move || store.read_closes(&symbol)).await
    }

    async fn load_sample(&self, symbol: &str) -> Result<Sample, SampleError> {
        let samples = Arc::clone(&self.samples);
        let symbol = symbol.to_string();
        run_blocking(move || samples.load(&symbol)).await
    }

    /// Price series for `symbol`, from the first tier that has data.
    pub async fn prices(&self, symbol: &str, range: &str, interval: &str) -> PriceSeries {
        let mut series = PriceSeries {
            symbol: symbol.to_string(),
            range: range.to_string(),
            interval: interval.to_string(),
            data: Vec::new(),
            stats: None,
            source: None,
        };

        match self.fetcher.get_historical(symbol, range, interval).await {
            Ok(live) => {
                match self.cache_prices(symbol, &live.data).await {
                    Ok(rows) => tracing::info!(symbol, rows, "cached live prices"),
                    Err(e) => tracing::error!(symbol, error = %e, "failed to cache live prices"),
                }
                series.stats = Some(self.year_stats(symbol).await);
                series.source = Some(live.tier);
                series.data = live.data;
                return series;
            }
            Err(e) => tracing::warn!(symbol, error = %e, "live fetch failed, trying cache"),
        }

        let outcome: Result<_, Infallible> = first_success(
            &[Tier::Cache, Tier::Sample],
            |tier| async move {
                match tier {
                    Tier::Cache => self
                        .cached_prices(symbol)
                        .await
                        .map(|bars| (symbol.to_string(), bars))
                        .map_err(|e| TierFailure::Skip(e.to_string())),
                    Tier::Sample => self
                        .load_sample(symbol)
                        .await
                        .map(|sample| {
                            tracing::debug!(symbol, dataset = %sample.dataset, "serving sample data");
                            (sample.symbol, sample.bars)
                        })
                        .map_err(|e| TierFailure::Skip(e.to_string())),
                    other => Err(TierFailure::Skip(format!("{other} is not a fallback tier"))),
                }
            },
            |(_, bars): &(String, Vec<PriceBar>)| !bars.is_empty(),
        )
        .await;

        match outcome.unwrap_or_else(|never| match never {}) {
            Some((tier, (reported, bars))) => {
                series.symbol = reported;
                series.data = bars;
                series.source = Some(tier);
            }
            None => tracing::error!(symbol, "no price data from any tier"),
        }
        series
    }

    /// Best-effort 52-week stats; any failure leaves the fields null.
    async fn year_stats(&self, symbol: &str) -> Week52Stats {
        match self
            .fetcher
            .get_historical(symbol, STATS_RANGE.as_str(), DAILY)
            .await
        {
            Ok(year) => week52_stats(&year.data),
            Err(e) => {
                tracing::debug!(symbol, error = %e, "52-week stats unavailable");
                Week52Stats::default()
            }
        }
    }

    /// Naive next-close prediction from the trailing `lookback` closes.
    pub async fn predict(&self, symbol: &str, lookback: usize) -> Result<Prediction, PredictError> {
        if lookback == 0 {
            return Err(PredictError::InvalidLookback);
        }
        match self.predict_from_tiers(symbol, lookback).await {
            Err(PredictError::InsufficientData) => Err(PredictError::InsufficientData),
            Err(e) => {
                tracing::error!(symbol, error = %e, "prediction failed, retrying with sample data");
                self.predict_from_sample(symbol, lookback).await
            }
            ok => ok,
        }
    }

    async fn predict_from_tiers(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> Result<Prediction, PredictError> {
        let found = first_success(
            &[CloseSource::Live, CloseSource::Cache, CloseSource::Sample],
            |source| async move {
                match source {
                    CloseSource::Live => self
                        .fetcher
                        .get_historical(symbol, PREDICTION_RANGE.as_str(), DAILY)
                        .await
                        .map(|live| closes(&live.data))
                        .map_err(|e| TierFailure::Skip(e.to_string())),
                    CloseSource::Cache => self
                        .cached_closes(symbol)
                        .await
                        .map_err(|e| TierFailure::Abort(PredictError::from(e))),
                    CloseSource::Sample => self
                        .load_sample(symbol)
                        .await
                        .map(|sample| closes(&sample.bars))
                        .map_err(|e| TierFailure::Skip(e.to_string())),
                }
            },
            |window: &Vec<f64>| window.len() >= lookback,
        )
        .await?;

        let Some((source, window)) = found else {
            return Err(PredictError::InsufficientData);
        };
        let (predicted_close, std) =
            predict_window(&window, lookback).ok_or(PredictError::InsufficientData)?;
        tracing::debug!(symbol, %source, lookback, "prediction computed");
        Ok(Prediction {
            symbol: symbol.to_string(),
            lookback,
            predicted_close,
            std,
        })
    }

    async fn predict_from_sample(
        &self,
        symbol: &str,
        lookback: usize,
    ) -> Result<Prediction, PredictError> {
        let sample = self.load_sample(symbol).await.map_err(|e| {
            tracing::error!(symbol, error = %e, "sample retry failed");
            PredictError::PredictionFailed
        })?;
        let (predicted_close, std) = predict_window(&closes(&sample.bars), lookback)
            .ok_or(PredictError::PredictionFailed)?;
        Ok(Prediction {
            symbol: sample.symbol,
            lookback,
            predicted_close,
            std,
        })
    }
}

//! Live historical data: primary provider first, secondary only if the
//! primary errored or came back empty.

use std::convert::Infallible;

use stockdash_api::{PriceBar, PriceProvider, ProviderSeries};

use crate::error::FetchError;
use crate::fallback::{first_success, Tier, TierFailure};

const LIVE_TIERS: [Tier; 2] = [Tier::Primary, Tier::Secondary];

/// A non-empty series from one of the live tiers.
#[derive(Debug, Clone)]
pub struct LiveSeries {
    pub tier: Tier,
    pub data: Vec<PriceBar>,
}

/// The single entry point for live data.
pub struct Fetcher {
    primary: Box<dyn PriceProvider>,
    secondary: Box<dyn PriceProvider>,
}

impl Fetcher {
    pub fn new(primary: Box<dyn PriceProvider>, secondary: Box<dyn PriceProvider>) -> Self {
        Self { primary, secondary }
    }

    pub async fn get_historical(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<LiveSeries, FetchError> {
        let outcome: Result<_, Infallible> = first_success(
            &LIVE_TIERS,
            |tier| async move {
                let provider = match tier {
                    Tier::Primary => &self.primary,
                    Tier::Secondary => &self.secondary,
                    other => return Err(TierFailure::Skip(format!("{other} is not a live tier"))),
                };
                provider
                    .fetch(symbol, range, interval)
                    .await
                    .map_err(|e| TierFailure::Skip(format!("{}: {}", provider.name(), e)))
            },
            |series: &ProviderSeries| !series.data.is_empty(),
        )
        .await;

        match outcome.unwrap_or_else(|never| match never {}) {
            Some((tier, series)) => {
                tracing::debug!(symbol, %tier, provider = series.provider, rows = series.data.len(), "live data");
                Ok(LiveSeries {
                    tier,
                    data: series.data,
                })
            }
            None => Err(FetchError::NoLiveData {
                symbol: symbol.to_string(),
            }),
        }
    }
}

//! 52-week summary stats and the rolling-mean close prediction.

use serde::Serialize;
use stockdash_api::PriceBar;

/// Summary over roughly one year of bars. Each field is null when no bar
/// carried the underlying value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Week52Stats {
    pub high52: Option<f64>,
    pub low52: Option<f64>,
    pub avg_vol: Option<i64>,
}

pub fn week52_stats(bars: &[PriceBar]) -> Week52Stats {
    let high52 = bars.iter().filter_map(|b| b.high).reduce(f64::max);
    let low52 = bars.iter().filter_map(|b| b.low).reduce(f64::min);

    let volumes: Vec<i64> = bars.iter().filter_map(|b| b.volume).collect();
    let avg_vol = if volumes.is_empty() {
        None
    } else {
        let total: f64 = volumes.iter().map(|&v| v as f64).sum();
        Some((total / volumes.len() as f64).round() as i64)
    };

    Week52Stats {
        high52,
        low52,
        avg_vol,
    }
}

/// Non-null closes in series order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().filter_map(|b| b.close).collect()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Mean and population standard deviation (divide by N) of the trailing
/// `lookback` closes, both rounded to 2 decimals.
///
/// Returns `None` when `lookback` is zero or exceeds the available closes.
pub fn predict_window(closes: &[f64], lookback: usize) -> Option<(f64, f64)> {
    if lookback == 0 || closes.len() < lookback {
        return None;
    }
    let window = &closes[closes.len() - lookback..];
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window.iter().map(|c| (c - mean).powi(2)).sum::<f64>() / n;
    Some((round2(mean), round2(variance.sqrt())))
}

//! Error types for the fetch and prediction paths.

use thiserror::Error;

use crate::store::StoreError;

/// Both live providers were exhausted for a symbol.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no live data from providers for {symbol}")]
    NoLiveData { symbol: String },
}

/// Errors produced while answering a prediction request.
#[derive(Error, Debug)]
pub enum PredictError {
    /// The lookback window is not a positive integer.
    #[error("Invalid lookback")]
    InvalidLookback,
    /// No tier produced at least `lookback` closes.
    #[error("Not enough data")]
    InsufficientData,
    /// Even the sample-only retry could not produce a prediction.
    #[error("Prediction failed")]
    PredictionFailed,
    #[error(transparent)]
    Store(#[from] StoreError),
}

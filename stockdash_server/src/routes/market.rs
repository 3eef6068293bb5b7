use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use stockdash_lib::{Company, Dashboard, PredictError, PriceSeries, Prediction};

use crate::error::ApiError;

const DEFAULT_LOOKBACK: usize = 5;

#[derive(Debug, Deserialize)]
pub struct PriceQuery {
    #[serde(default = "default_range")]
    range: String,
    #[serde(default = "default_interval")]
    interval: String,
}

fn default_range() -> String {
    "6mo".to_string()
}

fn default_interval() -> String {
    "1d".to_string()
}

/// `lookback` stays a string so that a malformed value reaches the handler
/// and gets the JSON error body instead of axum's plain-text rejection.
#[derive(Debug, Deserialize)]
pub struct PredictQuery {
    lookback: Option<String>,
}

pub fn routes() -> Router<Arc<Dashboard>> {
    Router::new()
        .route("/companies", get(companies))
        .route("/prices/:symbol", get(prices))
        .route("/predict/:symbol", get(predict))
}

async fn companies(State(dashboard): State<Arc<Dashboard>>) -> Result<Json<Vec<Company>>, ApiError> {
    Ok(Json(dashboard.companies().await?))
}

async fn prices(
    State(dashboard): State<Arc<Dashboard>>,
    Path(symbol): Path<String>,
    Query(q): Query<PriceQuery>,
) -> Json<PriceSeries> {
    Json(dashboard.prices(&symbol, &q.range, &q.interval).await)
}

async fn predict(
    State(dashboard): State<Arc<Dashboard>>,
    Path(symbol): Path<String>,
    Query(q): Query<PredictQuery>,
) -> Result<Json<Prediction>, ApiError> {
    let lookback = parse_lookback(q.lookback.as_deref())?;
    Ok(Json(dashboard.predict(&symbol, lookback).await?))
}

fn parse_lookback(raw: Option<&str>) -> Result<usize, PredictError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(DEFAULT_LOOKBACK),
        Some(s) => match s.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(PredictError::InvalidLookback),
        },
    }
}

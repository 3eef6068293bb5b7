//! Library layer for the stock dashboard: tiered price retrieval, the
//! SQLite-backed price cache, canned sample data, and the request-level
//! service that composes them.

pub mod analysis;
pub mod error;
pub mod fallback;
pub mod fetcher;
pub mod sample;
pub mod service;
pub mod store;

pub use stockdash_api;
pub use stockdash_api::{PriceBar, PriceProvider, Range};

pub use error::{FetchError, PredictError};
pub use fallback::{first_success, Tier, TierFailure};
pub use fetcher::{Fetcher, LiveSeries};
pub use sample::{Sample, SampleError, SampleStore};
pub use service::{Dashboard, Prediction, PriceSeries};
pub use store::{Company, Store, StoreError};

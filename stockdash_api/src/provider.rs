use std::future::Future;
use std::pin::Pin;

use crate::{ProviderError, ProviderSeries};

/// Boxed future returned by [`PriceProvider::fetch`].
pub type ProviderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ProviderSeries, ProviderError>> + Send + 'a>>;

/// A source of historical daily bars.
///
/// `range` is one of the strings understood by [`crate::range_to_days`];
/// providers that cannot honour `interval` ignore it.
pub trait PriceProvider: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn fetch<'a>(&'a self, symbol: &'a str, range: &'a str, interval: &'a str)
        -> ProviderFuture<'a>;
}

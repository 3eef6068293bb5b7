//! Ordered source fallback.
//!
//! Every place that needs "try this, else that" goes through
//! [`first_success`]: the caller lists its sources in priority order and
//! supplies one attempt function plus an acceptance rule.

use std::fmt;
use std::future::Future;

use serde::Serialize;

/// Where a price series came from, in fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Primary,
    Secondary,
    Cache,
    Sample,
}

impl Tier {
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Primary => "primary",
            Tier::Secondary => "secondary",
            Tier::Cache => "cache",
            Tier::Sample => "sample",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a single source attempt produced nothing.
#[derive(Debug)]
pub enum TierFailure<E> {
    /// Expected failure; move on to the next source.
    Skip(String),
    /// Unexpected failure; stop the whole chain.
    Abort(E),
}

/// Try `sources` strictly in order and return the first accepted value.
///
/// Returns `Ok(None)` when every source was skipped or rejected.
pub async fn first_success<S, T, E, F, Fut, A>(
    sources: &[S],
    mut attempt: F,
    accept: A,
) -> Result<Option<(S, T)>, E>
where
    S: Copy + fmt::Display,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T, TierFailure<E>>>,
    A: Fn(&T) -> bool,
{
    for &source in sources {
        match attempt(source).await {
            Ok(value) if accept(&value) => return Ok(Some((source, value))),
            Ok(_) => tracing::warn!(%source, "source result not usable, trying next"),
            Err(TierFailure::Skip(reason)) => {
                tracing::warn!(%source, %reason, "source failed, trying next")
            }
            Err(TierFailure::Abort(e)) => return Err(e),
        }
    }
    Ok(None)
}

//! Error types for the provider clients.

/// Errors that can occur when fetching from an upstream price provider.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The provider answered but no usable rows were left after filtering.
    #[error("{provider} returned no data for {symbol}")]
    EmptyResult {
        provider: &'static str,
        symbol: String,
    },
    /// The payload did not have the expected shape.
    #[error("unexpected {provider} response: {detail}")]
    BadFormat {
        provider: &'static str,
        detail: String,
    },
    /// The provider returned a non-success status with a body snippet.
    #[error("request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The configured base URL could not be turned into a request URL.
    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Transport failure (DNS, connect, timeout, body read).
    #[error("network error")]
    Network(#[from] reqwest::Error),
}

//! Canned per-symbol datasets used when neither live providers nor the
//! cache have anything for a symbol.
//!
//! Files live in one directory as `{SYMBOL}_sample.json`, each a JSON array
//! of price bars. A missing or malformed file for the requested symbol is
//! replaced by the default symbol's dataset.

use std::path::PathBuf;

use stockdash_api::PriceBar;
use thiserror::Error;

pub const DEFAULT_SAMPLE_SYMBOL: &str = "AAPL";

#[derive(Error, Debug)]
pub enum SampleError {
    #[error("failed to read sample {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse sample {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    /// The default dataset itself is unusable; this is a deployment problem.
    #[error("default sample dataset unavailable: {0}")]
    Config(Box<SampleError>),
    #[error("sample task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A loaded sample dataset.
#[derive(Debug, Clone)]
pub struct Sample {
    /// The requested symbol, upper-cased.
    pub symbol: String,
    /// The symbol whose file was actually read.
    pub dataset: String,
    pub bars: Vec<PriceBar>,
}

pub struct SampleStore {
    dir: PathBuf,
    default_symbol: String,
}

impl SampleStore {
    pub fn new(dir: impl Into<PathBuf>, default_symbol: &str) -> Self {
        Self {
            dir: dir.into(),
            default_symbol: default_symbol.to_uppercase(),
        }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}_sample.json", symbol))
    }

    fn read(&self, symbol: &str) -> Result<Vec<PriceBar>, SampleError> {
        let path = self.path_for(symbol);
        let raw = std::fs::read_to_string(&path).map_err(|source| SampleError::Io {
            path: path.clone(),
            source,
        })?;
        let mut bars: Vec<PriceBar> =
            serde_json::from_str(&raw).map_err(|source| SampleError::Parse { path, source })?;
        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }

    /// Load the dataset for `symbol`, substituting the default dataset if needed.
    pub fn load(&self, symbol: &str) -> Result<Sample, SampleError> {
        let wanted = symbol.trim().to_uppercase();
        match self.read(&wanted) {
            Ok(bars) => {
                return Ok(Sample {
                    dataset: wanted.clone(),
                    symbol: wanted,
                    bars,
                })
            }
            Err(e) => tracing::debug!(symbol = %wanted, error = %e, "no usable sample, using default"),
        }

        let bars = self
            .read(&self.default_symbol)
            .map_err(|e| SampleError::Config(Box::new(e)))?;
        Ok(Sample {
            symbol: wanted,
            dataset: self.default_symbol.clone(),
            bars,
        })
    }
}

use thiserror::Error;

/// Fatal data-layer errors.
///
/// A `DataError` aborts a run before any simulation starts. Everything else
/// (provider failures, risk rejections, per-candle faults) is absorbed by the
/// driver and the run continues.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DataError {
    /// Fewer candles than the indicator floor requires.
    #[error("insufficient candle history: need {required}, got {got}")]
    InsufficientHistory {
        /// Minimum number of candles required.
        required: usize,
        /// Number of candles actually available.
        got: usize,
    },

    /// Timeframe string does not parse.
    #[error("invalid timeframe {0:?} (expected forms like \"1m\", \"15m\", \"1h\", \"1d\")")]
    InvalidTimeframe(String),
}

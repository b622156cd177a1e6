use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single OHLCV candle for a fixed time bucket.
///
/// Candles are immutable once produced. The candle supplier guarantees
/// time-ascending, duplicate-free sequences per pair and timeframe; the
/// engine never reorders or de-duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: Decimal,
}

impl Candle {
    /// Typical price (H+L+C)/3, the per-candle price used for VWAP.
    #[must_use]
    pub fn typical_price(&self) -> Decimal {
        (self.high + self.low + self.close) / Decimal::from(3)
    }

    /// Midpoint (H+L)/2, the representative price for volume bucketing.
    #[must_use]
    pub fn midpoint(&self) -> Decimal {
        (self.high + self.low) / Decimal::from(2)
    }

    /// High-low range of the candle.
    #[must_use]
    pub fn range(&self) -> Decimal {
        self.high - self.low
    }

    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

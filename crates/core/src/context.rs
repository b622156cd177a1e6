use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Qualitative market regime derived from an indicator snapshot and the
/// candle window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    pub volatility: Volatility,
    pub trend: Trend,
    pub momentum: Momentum,
    /// Minimum low of the trailing window, if enough candles exist.
    pub support: Option<Decimal>,
    /// Maximum high of the trailing window, if enough candles exist.
    pub resistance: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Volatility {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Bullish,
    Bearish,
    Sideways,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Momentum {
    Strong,
    Weak,
    Neutral,
}

//! Indicator snapshot types shared between the indicator engine and its
//! consumers (classifier, decision requests, persisted results).
//!
//! Optional computations are modeled as `Option<..>` so downstream logic can
//! tell "not computed" apart from "computed as zero".

use serde::{Deserialize, Serialize};

/// Read-only view of all indicators derived from one candle window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// RSI(14) in [0, 100].
    pub rsi: f64,
    pub macd: MacdIndicator,
    pub bollinger: BollingerBands,
    pub sma_short: f64,
    pub sma_long: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    /// Average true range over the configured period.
    pub atr: f64,
    pub vwap: Option<VwapBands>,
    pub keltner: Option<KeltnerChannels>,
    pub squeeze: Option<SqueezeState>,
    pub volume_profile: Option<VolumeProfile>,
    pub market_delta: Option<MarketDelta>,
}

/// MACD line, signal line, and histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerBands {
    #[must_use]
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Band width relative to the middle band; the volatility / squeeze metric.
    #[must_use]
    pub fn width_ratio(&self) -> f64 {
        if self.middle == 0.0 {
            0.0
        } else {
            self.width() / self.middle
        }
    }
}

/// Full-window cumulative VWAP with standard-deviation bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VwapBands {
    pub vwap: f64,
    pub upper_1: f64,
    pub lower_1: f64,
    pub upper_2: f64,
    pub lower_2: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeltnerChannels {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

/// Volatility-compression state: Bollinger Bands inside Keltner Channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqueezeState {
    pub is_active: bool,
    pub intensity: SqueezeIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqueezeIntensity {
    High,
    Medium,
    Low,
}

/// One price bucket of the volume profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolumeBucket {
    pub low: f64,
    pub high: f64,
    pub volume: f64,
}

/// Volume-at-price histogram with point of control and 70% value area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeProfile {
    /// Point of control: midpoint of the highest-volume bucket.
    pub poc: f64,
    /// Value area high.
    pub vah: f64,
    /// Value area low.
    pub val: f64,
    pub total_volume: f64,
    pub buckets: Vec<VolumeBucket>,
}

/// Buy/sell volume imbalance over the trailing window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarketDelta {
    pub buy_volume: f64,
    pub sell_volume: f64,
    pub delta: f64,
    /// Delta as a percentage of total volume, in [-100, 100].
    pub delta_pct: f64,
    pub imbalance: VolumeImbalance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeImbalance {
    StrongBuy,
    Buy,
    Neutral,
    Sell,
    StrongSell,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_width_ratio_guards_zero_middle() {
        let bands = BollingerBands {
            upper: 1.0,
            middle: 0.0,
            lower: -1.0,
        };
        assert!((bands.width_ratio() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bollinger_width_is_upper_minus_lower() {
        let bands = BollingerBands {
            upper: 105.0,
            middle: 100.0,
            lower: 95.0,
        };
        assert!((bands.width() - 10.0).abs() < f64::EPSILON);
        assert!((bands.width_ratio() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn optional_indicators_serialize_as_null_when_absent() {
        let snapshot = IndicatorSnapshot {
            rsi: 50.0,
            macd: MacdIndicator {
                macd: 0.0,
                signal: 0.0,
                histogram: 0.0,
            },
            bollinger: BollingerBands {
                upper: 1.0,
                middle: 1.0,
                lower: 1.0,
            },
            sma_short: 1.0,
            sma_long: 1.0,
            ema_fast: 1.0,
            ema_slow: 1.0,
            atr: 0.0,
            vwap: None,
            keltner: None,
            squeeze: None,
            volume_profile: None,
            market_delta: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json["vwap"].is_null());
        assert!(json["volume_profile"].is_null());
    }
}

//! Keltner Channels and Bollinger/Keltner squeeze detection.

use crate::math::{atr, dec_f64, ema};
use tradesim_core::{BollingerBands, Candle, KeltnerChannels, SqueezeIntensity, SqueezeState};

/// Keltner Channels: EMA middle with `multiplier` x ATR on either side.
#[must_use]
pub fn compute_keltner(candles: &[Candle], period: usize, multiplier: f64) -> KeltnerChannels {
    let closes: Vec<f64> = candles.iter().map(|c| dec_f64(c.close)).collect();
    let middle = ema(&closes, period);
    let band = multiplier * atr(candles, period);

    KeltnerChannels {
        upper: middle + band,
        middle,
        lower: middle - band,
    }
}

/// A squeeze is active when the Bollinger Bands sit strictly inside the
/// Keltner Channels. Intensity comes from the Bollinger width relative to
/// its middle band: under 1.5% high, under 2.5% medium, otherwise low.
#[must_use]
pub fn detect_squeeze(bollinger: &BollingerBands, keltner: &KeltnerChannels) -> SqueezeState {
    let is_active = bollinger.upper < keltner.upper && bollinger.lower > keltner.lower;

    let ratio = bollinger.width_ratio();
    let intensity = if ratio < 0.015 {
        SqueezeIntensity::High
    } else if ratio < 0.025 {
        SqueezeIntensity::Medium
    } else {
        SqueezeIntensity::Low
    };

    SqueezeState {
        is_active,
        intensity,
    }
}

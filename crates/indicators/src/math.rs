//! Shared numeric building blocks for the indicator pipeline.
//!
//! Prices arrive as `Decimal` and are converted to `f64` once at the window
//! boundary; everything downstream is plain float math.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tradesim_core::Candle;

/// Decimal to f64 at the indicator boundary.
#[must_use]
pub fn dec_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
#[must_use]
pub fn stddev_pop(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Simple moving average over the trailing `period` values. With fewer
/// values than `period`, averages everything available.
#[must_use]
pub fn sma(values: &[f64], period: usize) -> f64 {
    let start = values.len().saturating_sub(period);
    mean(&values[start..])
}

/// Exponential moving average seeded with the SMA of the first `period`
/// values, then the standard recursion with multiplier 2/(period+1).
/// With fewer values than `period`, degrades to the SMA of all values.
#[must_use]
pub fn ema(values: &[f64], period: usize) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    if values.len() <= period {
        return mean(values);
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut current = mean(&values[..period]);
    for &value in &values[period..] {
        current = (value - current) * k + current;
    }
    current
}

/// EMA of every prefix of `values`, with the same seeding rule as [`ema`].
/// `out[i] == ema(&values[..=i], period)`.
#[must_use]
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    let k = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    let mut current = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period {
            sum += value;
            current = sum / (i + 1) as f64;
        } else {
            current = (value - current) * k + current;
        }
        out.push(current);
    }
    out
}

/// RSI over the trailing `period` close-to-close deltas, Wilder-style simple
/// averaging (no exponential smoothing). An all-gain window returns 100.
#[must_use]
pub fn rsi(closes: &[f64], period: usize) -> f64 {
    if closes.len() < period + 1 {
        return 50.0;
    }

    let window = &closes[closes.len() - period - 1..];
    let mut gains = 0.0;
    let mut losses = 0.0;
    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
}

/// True range of one candle given the previous close.
#[must_use]
pub fn true_range(candle: &Candle, prev_close: f64) -> f64 {
    let high = dec_f64(candle.high);
    let low = dec_f64(candle.low);
    let hl = high - low;
    let hc = (high - prev_close).abs();
    let lc = (low - prev_close).abs();
    hl.max(hc).max(lc)
}

/// Average true range: mean true range of the trailing `period` candles.
#[must_use]
pub fn atr(candles: &[Candle], period: usize) -> f64 {
    if candles.len() < period + 1 {
        return 0.0;
    }

    let start = candles.len() - period;
    let ranges: Vec<f64> = (start..candles.len())
        .map(|i| true_range(&candles[i], dec_f64(candles[i - 1].close)))
        .collect();
    mean(&ranges)
}

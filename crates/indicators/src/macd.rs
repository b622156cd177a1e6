//! MACD with a configurable signal line.
//!
//! The default signal line is the scaled approximation (0.9 x MACD) rather
//! than the textbook 9-period EMA of the MACD series. Strategy behavior can
//! depend on the approximation, so it is preserved as the default and the
//! EMA variant is opt-in via `MacdSignalMode::Ema`.

use crate::math::{ema, ema_series};
use tradesim_core::{MacdIndicator, MacdSignalMode};

#[must_use]
pub fn compute_macd(
    closes: &[f64],
    fast_period: usize,
    slow_period: usize,
    signal_mode: MacdSignalMode,
) -> MacdIndicator {
    let macd = ema(closes, fast_period) - ema(closes, slow_period);

    let signal = match signal_mode {
        MacdSignalMode::Scaled { factor } => factor * macd,
        MacdSignalMode::Ema { period } => {
            let fast = ema_series(closes, fast_period);
            let slow = ema_series(closes, slow_period);
            let macd_series: Vec<f64> = fast
                .iter()
                .zip(slow.iter())
                .map(|(f, s)| f - s)
                .collect();
            ema(&macd_series, period)
        }
    };

    MacdIndicator {
        macd,
        signal,
        histogram: macd - signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trending_closes() -> Vec<f64> {
        (0..60).map(|i| 100.0 + f64::from(i) * 0.8).collect()
    }

    #[test]
    fn scaled_signal_is_fraction_of_macd() {
        let closes = trending_closes();
        let macd = compute_macd(&closes, 12, 26, MacdSignalMode::Scaled { factor: 0.9 });

        assert!((macd.signal - 0.9 * macd.macd).abs() < 1e-12);
        assert!((macd.histogram - (macd.macd - macd.signal)).abs() < 1e-12);
    }

    #[test]
    fn uptrend_produces_positive_macd() {
        let closes = trending_closes();
        let macd = compute_macd(&closes, 12, 26, MacdSignalMode::default());
        assert!(macd.macd > 0.0, "fast EMA should lead in an uptrend");
        assert!(macd.histogram > 0.0);
    }

    #[test]
    fn downtrend_produces_negative_macd() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - f64::from(i) * 0.8).collect();
        let macd = compute_macd(&closes, 12, 26, MacdSignalMode::default());
        assert!(macd.macd < 0.0);
    }

    #[test]
    fn ema_signal_mode_diverges_from_scaled() {
        // A reversal makes the EMA-of-MACD lag; the scaled line cannot lag.
        let mut closes = trending_closes();
        closes.extend((0..20).map(|i| 148.0 - f64::from(i) * 1.5));

        let scaled = compute_macd(&closes, 12, 26, MacdSignalMode::Scaled { factor: 0.9 });
        let textbook = compute_macd(&closes, 12, 26, MacdSignalMode::Ema { period: 9 });

        assert!((scaled.macd - textbook.macd).abs() < 1e-12, "MACD line is mode-independent");
        assert!((scaled.signal - textbook.signal).abs() > 1e-9, "signal lines should differ");
    }

    #[test]
    fn flat_prices_zero_everything() {
        let closes = vec![100.0; 60];
        let macd = compute_macd(&closes, 12, 26, MacdSignalMode::default());
        assert!((macd.macd - 0.0).abs() < 1e-12);
        assert!((macd.signal - 0.0).abs() < 1e-12);
        assert!((macd.histogram - 0.0).abs() < 1e-12);
    }
}

//! Indicator computation pipeline.
//!
//! `compute` is a pure function of the candle window: no side effects, no
//! clock access, identical output for identical input. Optional indicator
//! families are gated by `IndicatorConfig` flags and come back as `None`
//! when disabled.

use crate::bollinger::compute_bollinger;
use crate::keltner::{compute_keltner, detect_squeeze};
use crate::macd::compute_macd;
use crate::market_delta::compute_market_delta;
use crate::math::{atr, dec_f64, ema, rsi, sma};
use crate::volume_profile::compute_volume_profile;
use tradesim_core::{Candle, DataError, IndicatorConfig, IndicatorSnapshot, MIN_CANDLES};

#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    #[must_use]
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Computes a full indicator snapshot from the candle window.
    ///
    /// # Errors
    ///
    /// Returns `DataError::InsufficientHistory` when fewer than
    /// [`MIN_CANDLES`] candles are supplied; RSI seeding, the long SMA and
    /// the volume profile all assume that floor.
    pub fn compute(&self, candles: &[Candle]) -> Result<IndicatorSnapshot, DataError> {
        if candles.len() < MIN_CANDLES {
            return Err(DataError::InsufficientHistory {
                required: MIN_CANDLES,
                got: candles.len(),
            });
        }

        let cfg = &self.config;
        let closes: Vec<f64> = candles.iter().map(|c| dec_f64(c.close)).collect();

        let bollinger = compute_bollinger(&closes, cfg.bollinger_period, cfg.bollinger_stddev);

        let keltner = cfg
            .enable_keltner
            .then(|| compute_keltner(candles, cfg.keltner_period, cfg.keltner_multiplier));
        let squeeze = keltner.as_ref().map(|kc| detect_squeeze(&bollinger, kc));

        let volume_profile = cfg.enable_volume_profile.then(|| {
            let tail = &candles[candles.len().saturating_sub(cfg.volume_profile_candles)..];
            compute_volume_profile(tail, cfg.volume_profile_buckets, cfg.value_area_fraction)
        });

        let market_delta = cfg.enable_market_delta.then(|| {
            let tail = &candles[candles.len().saturating_sub(cfg.market_delta_lookback)..];
            compute_market_delta(tail)
        });

        Ok(IndicatorSnapshot {
            rsi: rsi(&closes, cfg.rsi_period),
            macd: compute_macd(
                &closes,
                cfg.ema_fast_period,
                cfg.ema_slow_period,
                cfg.macd_signal,
            ),
            bollinger,
            sma_short: sma(&closes, cfg.sma_short_period),
            sma_long: sma(&closes, cfg.sma_long_period),
            ema_fast: ema(&closes, cfg.ema_fast_period),
            ema_slow: ema(&closes, cfg.ema_slow_period),
            atr: atr(candles, cfg.atr_period),
            vwap: cfg.enable_vwap.then(|| crate::vwap::compute_vwap(candles)),
            keltner,
            squeeze,
            volume_profile,
            market_delta,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn make_window(len: usize) -> Vec<Candle> {
        let start = Utc::now();
        (0..len)
            .map(|i| {
                let close = 100 + (i as i64 % 10);
                Candle {
                    timestamp: start + Duration::minutes(i as i64),
                    open: Decimal::new(close - 1, 0),
                    high: Decimal::new(close + 2, 0),
                    low: Decimal::new(close - 2, 0),
                    close: Decimal::new(close, 0),
                    volume: dec!(1000),
                }
            })
            .collect()
    }

    #[test]
    fn rejects_windows_below_the_floor() {
        let engine = IndicatorEngine::new(IndicatorConfig::default());
        let err = engine.compute(&make_window(49)).unwrap_err();
        assert_eq!(
            err,
            DataError::InsufficientHistory {
                required: 50,
                got: 49
            }
        );
    }

    #[test]
    fn computes_all_families_at_the_floor() {
        let engine = IndicatorEngine::new(IndicatorConfig::default());
        let snapshot = engine.compute(&make_window(50)).unwrap();

        assert!((0.0..=100.0).contains(&snapshot.rsi));
        assert!(snapshot.vwap.is_some());
        assert!(snapshot.keltner.is_some());
        assert!(snapshot.squeeze.is_some());
        assert!(snapshot.volume_profile.is_some());
        assert!(snapshot.market_delta.is_some());
    }

    #[test]
    fn disabled_families_come_back_absent() {
        let config = IndicatorConfig {
            enable_vwap: false,
            enable_keltner: false,
            enable_volume_profile: false,
            enable_market_delta: false,
            ..IndicatorConfig::default()
        };
        let engine = IndicatorEngine::new(config);
        let snapshot = engine.compute(&make_window(60)).unwrap();

        assert!(snapshot.vwap.is_none());
        assert!(snapshot.keltner.is_none());
        assert!(snapshot.squeeze.is_none(), "squeeze needs keltner");
        assert!(snapshot.volume_profile.is_none());
        assert!(snapshot.market_delta.is_none());
    }

    #[test]
    fn compute_is_deterministic() {
        let engine = IndicatorEngine::new(IndicatorConfig::default());
        let window = make_window(80);
        let first = engine.compute(&window).unwrap();
        let second = engine.compute(&window).unwrap();
        assert_eq!(first, second);
    }
}

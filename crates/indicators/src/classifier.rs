//! Qualitative market regime from an indicator snapshot.

use tradesim_core::{Candle, IndicatorSnapshot, MarketContext, Momentum, Trend, Volatility};

/// Number of trailing candles scanned for support and resistance.
const SR_LOOKBACK: usize = 20;

pub struct MarketContextClassifier;

impl MarketContextClassifier {
    /// Derives volatility, trend, momentum, and coarse support/resistance.
    ///
    /// Support and resistance are simply the min low / max high of the
    /// trailing window, not pivot detection.
    #[must_use]
    pub fn classify(snapshot: &IndicatorSnapshot, candles: &[Candle]) -> MarketContext {
        let width_ratio = snapshot.bollinger.width_ratio();
        let volatility = if width_ratio < 0.02 {
            Volatility::Low
        } else if width_ratio < 0.05 {
            Volatility::Medium
        } else {
            Volatility::High
        };

        // 1% hysteresis band keeps choppy crossovers classified as sideways.
        let trend = if snapshot.sma_short > 1.01 * snapshot.sma_long {
            Trend::Bullish
        } else if snapshot.sma_short < 0.99 * snapshot.sma_long {
            Trend::Bearish
        } else {
            Trend::Sideways
        };

        let histogram_leads = snapshot.macd.histogram.abs() > 0.1 * snapshot.macd.macd.abs();
        let rsi_extended = snapshot.rsi > 60.0 || snapshot.rsi < 40.0;
        let momentum = match (histogram_leads, rsi_extended) {
            (true, true) => Momentum::Strong,
            (false, false) => Momentum::Weak,
            _ => Momentum::Neutral,
        };

        let tail = &candles[candles.len().saturating_sub(SR_LOOKBACK)..];
        let support = tail.iter().map(|c| c.low).min();
        let resistance = tail.iter().map(|c| c.high).max();

        MarketContext {
            volatility,
            trend,
            momentum,
            support,
            resistance,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use tradesim_core::{BollingerBands, MacdIndicator};

    fn make_candle(high: i64, low: i64) -> Candle {
        Candle {
            timestamp: Utc::now(),
            open: Decimal::new(low + 1, 0),
            high: Decimal::new(high, 0),
            low: Decimal::new(low, 0),
            close: Decimal::new(high - 1, 0),
            volume: dec!(100),
        }
    }

    fn snapshot(
        rsi: f64,
        macd: f64,
        histogram: f64,
        sma_short: f64,
        sma_long: f64,
        bb_width_ratio: f64,
    ) -> IndicatorSnapshot {
        let middle = 100.0;
        let half_width = middle * bb_width_ratio / 2.0;
        IndicatorSnapshot {
            rsi,
            macd: MacdIndicator {
                macd,
                signal: macd - histogram,
                histogram,
            },
            bollinger: BollingerBands {
                upper: middle + half_width,
                middle,
                lower: middle - half_width,
            },
            sma_short,
            sma_long,
            ema_fast: sma_short,
            ema_slow: sma_long,
            atr: 1.0,
            vwap: None,
            keltner: None,
            squeeze: None,
            volume_profile: None,
            market_delta: None,
        }
    }

    #[test]
    fn volatility_buckets_by_band_width() {
        let candles = vec![make_candle(101, 99)];
        let low = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 100.0, 100.0, 0.01),
            &candles,
        );
        assert_eq!(low.volatility, Volatility::Low);

        let medium = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 100.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(medium.volatility, Volatility::Medium);

        let high = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 100.0, 100.0, 0.08),
            &candles,
        );
        assert_eq!(high.volatility, Volatility::High);
    }

    #[test]
    fn trend_uses_one_percent_hysteresis() {
        let candles = vec![make_candle(101, 99)];

        let bullish = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 102.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(bullish.trend, Trend::Bullish);

        let bearish = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 98.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(bearish.trend, Trend::Bearish);

        // 0.5% above: inside the hysteresis band
        let sideways = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 100.5, 100.0, 0.03),
            &candles,
        );
        assert_eq!(sideways.trend, Trend::Sideways);
    }

    #[test]
    fn momentum_strong_needs_histogram_and_rsi() {
        let candles = vec![make_candle(101, 99)];

        let strong = MarketContextClassifier::classify(
            &snapshot(70.0, 1.0, 0.5, 100.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(strong.momentum, Momentum::Strong);

        // histogram leads but RSI centered: neutral
        let neutral = MarketContextClassifier::classify(
            &snapshot(50.0, 1.0, 0.5, 100.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(neutral.momentum, Momentum::Neutral);

        // neither condition: weak
        let weak = MarketContextClassifier::classify(
            &snapshot(50.0, 1.0, 0.05, 100.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(weak.momentum, Momentum::Weak);
    }

    #[test]
    fn support_resistance_span_the_trailing_window() {
        let mut candles: Vec<Candle> = (0..30).map(|_| make_candle(105, 95)).collect();
        candles.push(make_candle(120, 90));

        let context = MarketContextClassifier::classify(
            &snapshot(50.0, 0.0, 0.0, 100.0, 100.0, 0.03),
            &candles,
        );
        assert_eq!(context.support, Some(dec!(90)));
        assert_eq!(context.resistance, Some(dec!(120)));
    }
}

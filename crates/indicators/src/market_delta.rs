//! Buy/sell volume imbalance over a trailing window.

use crate::math::dec_f64;
use tradesim_core::{Candle, MarketDelta, VolumeImbalance};

/// Splits volume into buy (close above open) and sell (close at or below
/// open) sides and classifies the imbalance by delta percentage:
/// above 30 strong buy, above 10 buy, above -10 neutral, above -30 sell,
/// otherwise strong sell.
#[must_use]
pub fn compute_market_delta(candles: &[Candle]) -> MarketDelta {
    let mut buy_volume = 0.0;
    let mut sell_volume = 0.0;
    for candle in candles {
        let volume = dec_f64(candle.volume);
        if candle.is_bullish() {
            buy_volume += volume;
        } else {
            sell_volume += volume;
        }
    }

    let delta = buy_volume - sell_volume;
    let total = buy_volume + sell_volume;
    let delta_pct = if total > 0.0 { delta / total * 100.0 } else { 0.0 };

    let imbalance = if delta_pct > 30.0 {
        VolumeImbalance::StrongBuy
    } else if delta_pct > 10.0 {
        VolumeImbalance::Buy
    } else if delta_pct > -10.0 {
        VolumeImbalance::Neutral
    } else if delta_pct > -30.0 {
        VolumeImbalance::Sell
    } else {
        VolumeImbalance::StrongSell
    };

    MarketDelta {
        buy_volume,
        sell_volume,
        delta,
        delta_pct,
        imbalance,
    }
}

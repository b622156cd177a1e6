//! Full-window cumulative VWAP with standard-deviation bands.

use crate::math::{dec_f64, mean};
use tradesim_core::{Candle, VwapBands};

/// VWAP over the whole supplied window, with +/-1 and +/-2 sigma bands from
/// the dispersion of typical prices around the VWAP.
#[must_use]
pub fn compute_vwap(candles: &[Candle]) -> VwapBands {
    let typical: Vec<f64> = candles.iter().map(|c| dec_f64(c.typical_price())).collect();
    let volumes: Vec<f64> = candles.iter().map(|c| dec_f64(c.volume)).collect();

    let total_volume: f64 = volumes.iter().sum();
    let vwap = if total_volume > 0.0 {
        typical
            .iter()
            .zip(volumes.iter())
            .map(|(tp, v)| tp * v)
            .sum::<f64>()
            / total_volume
    } else {
        mean(&typical)
    };

    let dispersion = if typical.is_empty() {
        0.0
    } else {
        (typical.iter().map(|tp| (tp - vwap).powi(2)).sum::<f64>() / typical.len() as f64).sqrt()
    };

    VwapBands {
        vwap,
        upper_1: vwap + dispersion,
        lower_1: vwap - dispersion,
        upper_2: vwap + 2.0 * dispersion,
        lower_2: vwap - 2.0 * dispersion,
    }
}

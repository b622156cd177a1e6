use crate::math::{sma, stddev_pop};
use tradesim_core::BollingerBands;

/// Bollinger Bands: SMA middle with `k` population standard deviations on
/// either side, over the trailing `period` closes.
#[must_use]
pub fn compute_bollinger(closes: &[f64], period: usize, k: f64) -> BollingerBands {
    let start = closes.len().saturating_sub(period);
    let window = &closes[start..];
    let middle = sma(closes, period);
    let deviation = k * stddev_pop(window);

    BollingerBands {
        upper: middle + deviation,
        middle,
        lower: middle - deviation,
    }
}

//! Volume-at-price profile: equal-width buckets, point of control, and the
//! 70% value area.

use crate::math::dec_f64;
use tradesim_core::{Candle, VolumeBucket, VolumeProfile};

/// Builds a volume profile over the supplied candles.
///
/// The price range is the [min, max] observed across highs, lows and closes,
/// split into `bucket_count` equal buckets. Each candle contributes its full
/// volume at its (H+L)/2 midpoint. The value area grows outward from the
/// point of control, pulling whichever neighboring bucket holds more volume,
/// until at least `value_area_fraction` of total volume is enclosed.
#[must_use]
pub fn compute_volume_profile(
    candles: &[Candle],
    bucket_count: usize,
    value_area_fraction: f64,
) -> VolumeProfile {
    let mut min_price = f64::INFINITY;
    let mut max_price = f64::NEG_INFINITY;
    for candle in candles {
        for price in [
            dec_f64(candle.high),
            dec_f64(candle.low),
            dec_f64(candle.close),
        ] {
            min_price = min_price.min(price);
            max_price = max_price.max(price);
        }
    }

    let total_volume: f64 = candles.iter().map(|c| dec_f64(c.volume)).sum();

    if candles.is_empty() || bucket_count == 0 || max_price <= min_price {
        // Degenerate window (flat or empty): the whole profile sits at one price.
        let price = if min_price.is_finite() { min_price } else { 0.0 };
        tracing::debug!(price, "volume profile window is degenerate");
        return VolumeProfile {
            poc: price,
            vah: price,
            val: price,
            total_volume,
            buckets: vec![VolumeBucket {
                low: price,
                high: price,
                volume: total_volume,
            }],
        };
    }

    let width = (max_price - min_price) / bucket_count as f64;
    let mut volumes = vec![0.0_f64; bucket_count];
    for candle in candles {
        let midpoint = (dec_f64(candle.high) + dec_f64(candle.low)) / 2.0;
        let index = (((midpoint - min_price) / width) as usize).min(bucket_count - 1);
        volumes[index] += dec_f64(candle.volume);
    }

    let poc_index = volumes
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map_or(0, |(i, _)| i);

    // Expand the value area outward from the POC.
    let target = value_area_fraction * total_volume;
    let mut low_index = poc_index;
    let mut high_index = poc_index;
    let mut covered = volumes[poc_index];
    while covered < target && (low_index > 0 || high_index < bucket_count - 1) {
        let below = (low_index > 0).then(|| volumes[low_index - 1]);
        let above = (high_index < bucket_count - 1).then(|| volumes[high_index + 1]);

        match (below, above) {
            (Some(b), Some(a)) if b > a => {
                low_index -= 1;
                covered += b;
            }
            (_, Some(a)) => {
                high_index += 1;
                covered += a;
            }
            (Some(b), None) => {
                low_index -= 1;
                covered += b;
            }
            (None, None) => break,
        }
    }

    let bucket_low = |i: usize| min_price + width * i as f64;
    let buckets = volumes
        .iter()
        .enumerate()
        .map(|(i, &volume)| VolumeBucket {
            low: bucket_low(i),
            high: bucket_low(i) + width,
            volume,
        })
        .collect();

    VolumeProfile {
        poc: bucket_low(poc_index) + width / 2.0,
        vah: bucket_low(high_index) + width,
        val: bucket_low(low_index),
        total_volume,
        buckets,
    }
}

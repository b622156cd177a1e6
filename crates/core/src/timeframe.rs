use crate::error::DataError;
use std::time::Duration;

/// Parses a timeframe string like "1m", "15m", "1h", "4h" or "1d" into minutes.
///
/// # Errors
///
/// Returns `DataError::InvalidTimeframe` if the string has no numeric part,
/// a zero value, or an unknown unit suffix.
pub fn parse_timeframe(timeframe: &str) -> Result<u32, DataError> {
    let invalid = || DataError::InvalidTimeframe(timeframe.to_string());

    let unit_pos = timeframe
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(invalid)?;
    let (digits, unit) = timeframe.split_at(unit_pos);
    let value: u32 = digits.parse().map_err(|_| invalid())?;

    if value == 0 {
        return Err(invalid());
    }

    let minutes = match unit {
        "m" => value,
        "h" => value.checked_mul(60).ok_or_else(invalid)?,
        "d" => value.checked_mul(24 * 60).ok_or_else(invalid)?,
        _ => return Err(invalid()),
    };

    Ok(minutes)
}

/// Polling interval corresponding to a timeframe, for the paper-trading timer.
#[must_use]
pub fn timeframe_duration(minutes: u32) -> Duration {
    Duration::from_secs(u64::from(minutes) * 60)
}

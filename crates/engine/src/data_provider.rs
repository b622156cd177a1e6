//! CSV-backed candle supplier for backtests and offline paper runs.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;
use tradesim_core::{Candle, CandleSupplier};

/// How many trailing candles `latest_candles` returns.
const LATEST_WINDOW: usize = 100;

pub struct CsvCandleSupplier {
    candles: Vec<Candle>,
}

impl CsvCandleSupplier {
    /// Loads candles from a CSV file with header
    /// `timestamp,open,high,low,close,volume` (RFC 3339 timestamps).
    /// Rows are sorted chronologically after load, so file order is
    /// forgiving even though consumers require ascending time.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or a row fails to
    /// parse.
    pub fn from_csv(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path)
            .with_context(|| format!("opening candle file {}", path.display()))?;

        let mut candles = Vec::new();
        for (row, result) in reader.records().enumerate() {
            let record = result.with_context(|| format!("reading row {row}"))?;
            let parse = |i: usize, name: &str| -> Result<Decimal> {
                Decimal::from_str(record.get(i).unwrap_or_default())
                    .with_context(|| format!("row {row}: bad {name} value"))
            };

            candles.push(Candle {
                timestamp: record
                    .get(0)
                    .unwrap_or_default()
                    .parse::<DateTime<Utc>>()
                    .with_context(|| format!("row {row}: bad timestamp"))?,
                open: parse(1, "open")?,
                high: parse(2, "high")?,
                low: parse(3, "low")?,
                close: parse(4, "close")?,
                volume: parse(5, "volume")?,
            });
        }

        candles.sort_by_key(|c| c.timestamp);
        tracing::info!(path = %path.display(), count = candles.len(), "loaded candles");

        Ok(Self { candles })
    }

    /// Wraps an in-memory candle sequence (must be time-ascending).
    #[must_use]
    pub fn from_candles(candles: Vec<Candle>) -> Self {
        Self { candles }
    }

    #[must_use]
    pub fn candles(&self) -> &[Candle] {
        &self.candles
    }

    /// All candles, consuming the supplier. Convenient for feeding a
    /// backtest directly.
    #[must_use]
    pub fn into_candles(self) -> Vec<Candle> {
        self.candles
    }
}

#[async_trait]
impl CandleSupplier for CsvCandleSupplier {
    async fn historical_candles(
        &self,
        _pair: &str,
        _timeframe_minutes: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>> {
        Ok(self
            .candles
            .iter()
            .filter(|c| c.timestamp >= start && c.timestamp <= end)
            .cloned()
            .collect())
    }

    async fn latest_candles(&self, _pair: &str, _timeframe_minutes: u32) -> Result<Vec<Candle>> {
        let start = self.candles.len().saturating_sub(LATEST_WINDOW);
        Ok(self.candles[start..].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::io::Write;

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + chrono::Duration::minutes(minute)
    }

    fn write_csv(rows: &[&str]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!(
            "tradesim-candles-{}.csv",
            uuid::Uuid::new_v4()
        ));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "timestamp,open,high,low,close,volume").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        path
    }

    #[test]
    fn loads_and_sorts_rows() {
        let path = write_csv(&[
            "2024-06-01T00:05:00Z,101,102,100,101.5,900",
            "2024-06-01T00:00:00Z,100,101,99,100.5,1000",
        ]);
        let supplier = CsvCandleSupplier::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let candles = supplier.candles();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, at(0));
        assert_eq!(candles[1].timestamp, at(5));
        assert_eq!(candles[0].close, Decimal::from_str("100.5").unwrap());
    }

    #[test]
    fn rejects_malformed_rows() {
        let path = write_csv(&["not-a-timestamp,1,2,3,4,5"]);
        let result = CsvCandleSupplier::from_csv(&path);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn historical_filters_by_range() {
        let path = write_csv(&[
            "2024-06-01T00:00:00Z,100,101,99,100,1000",
            "2024-06-01T00:05:00Z,100,101,99,100,1000",
            "2024-06-01T00:10:00Z,100,101,99,100,1000",
        ]);
        let supplier = CsvCandleSupplier::from_csv(&path).unwrap();
        std::fs::remove_file(&path).ok();

        let slice = supplier
            .historical_candles("BTC/USD", 5, at(5), at(10))
            .await
            .unwrap();
        assert_eq!(slice.len(), 2);
        assert_eq!(slice[0].timestamp, at(5));
    }

    #[tokio::test]
    async fn latest_returns_the_tail() {
        let candles: Vec<Candle> = (0..150)
            .map(|i| Candle {
                timestamp: at(i),
                open: Decimal::from(100),
                high: Decimal::from(101),
                low: Decimal::from(99),
                close: Decimal::from(100),
                volume: Decimal::from(1000),
            })
            .collect();
        let supplier = CsvCandleSupplier::from_candles(candles);

        let latest = supplier.latest_candles("BTC/USD", 5).await.unwrap();
        assert_eq!(latest.len(), 100);
        assert_eq!(latest.last().unwrap().timestamp, at(149));
    }
}

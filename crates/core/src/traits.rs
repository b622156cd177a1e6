use crate::candle::Candle;
use crate::decision::{DecisionRequest, TradeDecision};
use crate::stats::PerformanceStats;
use crate::trade::TradeRecord;
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Market-data collaborator. Implementations must return time-ascending,
/// duplicate-free candles.
#[async_trait]
pub trait CandleSupplier: Send + Sync {
    async fn historical_candles(
        &self,
        pair: &str,
        timeframe_minutes: u32,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>>;

    /// Most recent candles for the pair, ascending. Used by paper trading.
    async fn latest_candles(&self, pair: &str, timeframe_minutes: u32) -> Result<Vec<Candle>>;
}

/// External decision collaborator. The driver enforces a timeout around
/// `decide` and substitutes a zero-confidence HOLD on any failure, so
/// implementations may block or error freely.
#[async_trait]
pub trait DecisionProvider: Send + Sync {
    async fn decide(&self, request: &DecisionRequest) -> Result<TradeDecision>;

    fn name(&self) -> &str;
}

/// Snapshot pushed to a dashboard sink after each processed candle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardUpdate {
    pub stats: PerformanceStats,
    pub trades: Vec<TradeRecord>,
    pub initial_capital: Decimal,
    pub current_price: Decimal,
    pub timestamp: DateTime<Utc>,
}

/// Best-effort side channel. Failures are logged by the driver and never
/// block, retry, or fail the pipeline.
#[async_trait]
pub trait DashboardSink: Send + Sync {
    async fn push(&self, update: &DashboardUpdate) -> Result<()>;
}

//! Bulk replay over a pre-fetched candle sequence.

use crate::pipeline::SimulationPipeline;
use crate::result::BacktestResult;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tradesim_core::{
    parse_timeframe, AppConfig, Candle, DashboardSink, DataError, DecisionProvider, MIN_CANDLES,
};

pub struct BacktestRunner {
    config: AppConfig,
    provider: Arc<dyn DecisionProvider>,
    sink: Option<Arc<dyn DashboardSink>>,
}

impl BacktestRunner {
    #[must_use]
    pub fn new(config: AppConfig, provider: Arc<dyn DecisionProvider>) -> Self {
        Self {
            config,
            provider,
            sink: None,
        }
    }

    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DashboardSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Replays the candle sequence with a growing window, starting once the
    /// indicator floor is met, then force-closes any open position against
    /// the final candle.
    ///
    /// # Errors
    ///
    /// Fatal before the loop starts: a malformed timeframe string or fewer
    /// than [`MIN_CANDLES`] candles. Per-candle faults inside the loop are
    /// logged, counted, and skipped.
    pub async fn run(&self, candles: Vec<Candle>) -> Result<BacktestResult> {
        parse_timeframe(&self.config.simulation.timeframe)?;

        if candles.len() < MIN_CANDLES {
            return Err(DataError::InsufficientHistory {
                required: MIN_CANDLES,
                got: candles.len(),
            }
            .into());
        }

        let start_date = candles.first().context("no candles")?.timestamp;
        let end_date = candles.last().context("no candles")?.timestamp;
        tracing::info!(
            pair = %self.config.simulation.pair,
            candles = candles.len(),
            %start_date,
            %end_date,
            "starting backtest"
        );

        let started = Instant::now();
        let mut pipeline = SimulationPipeline::new(
            self.config.clone(),
            self.provider.clone(),
            self.sink.clone(),
            start_date,
        );

        let mut fault_count = 0_usize;
        for end in MIN_CANDLES..=candles.len() {
            let window = &candles[..end];
            if let Err(error) = pipeline.process_candle(window).await {
                fault_count += 1;
                tracing::error!(
                    %error,
                    candle = %window[end - 1].timestamp,
                    "candle processing fault, skipping"
                );
            }
        }

        let last = candles.last().context("no candles")?;
        pipeline.force_close(last)?;

        let result = pipeline.into_result(fault_count, started.elapsed(), start_date, end_date);
        tracing::info!(
            trades = result.stats.total_trades,
            pnl = %result.stats.total_pnl,
            faults = result.fault_count,
            "backtest finished"
        );
        Ok(result)
    }
}

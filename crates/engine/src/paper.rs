//! Timer-driven paper trading over live-polled candles.
//!
//! Same pipeline as a backtest, but candles arrive from the supplier on a
//! fixed timer derived from the configured timeframe. Duplicate polls are
//! idempotent: a candle is processed only if its timestamp is strictly
//! newer than the last one processed. History is a bounded rolling window.

use crate::pipeline::SimulationPipeline;
use crate::tracker::PerformanceTracker;
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tradesim_core::{
    parse_timeframe, timeframe_duration, AppConfig, Candle, CandleSupplier, DashboardSink,
    DecisionProvider, MIN_CANDLES,
};

pub struct PaperTrader {
    config: AppConfig,
    timeframe_minutes: u32,
    supplier: Arc<dyn CandleSupplier>,
    pipeline: SimulationPipeline,
    history: VecDeque<Candle>,
    last_processed: Option<DateTime<Utc>>,
    fault_count: usize,
}

impl PaperTrader {
    /// # Errors
    ///
    /// Fails fast on a malformed timeframe string; that is a structural
    /// configuration error, not a per-tick fault.
    pub fn new(
        config: AppConfig,
        supplier: Arc<dyn CandleSupplier>,
        provider: Arc<dyn DecisionProvider>,
        sink: Option<Arc<dyn DashboardSink>>,
    ) -> Result<Self> {
        let timeframe_minutes = parse_timeframe(&config.simulation.timeframe)?;
        let pipeline = SimulationPipeline::new(config.clone(), provider, sink, Utc::now());

        Ok(Self {
            timeframe_minutes,
            supplier,
            pipeline,
            history: VecDeque::with_capacity(config.simulation.history_limit),
            last_processed: None,
            fault_count: 0,
            config,
        })
    }

    #[must_use]
    pub fn tracker(&self) -> &PerformanceTracker {
        self.pipeline.tracker()
    }

    #[must_use]
    pub fn fault_count(&self) -> usize {
        self.fault_count
    }

    /// Runs the polling loop until `shutdown` flips to true.
    ///
    /// Ticks never overlap: the timer defers a missed tick until the
    /// current one finishes, and the pipeline runs on this single task.
    ///
    /// # Errors
    ///
    /// Only setup errors escape; per-tick faults are logged and absorbed.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let mut ticker = tokio::time::interval(timeframe_duration(self.timeframe_minutes));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            pair = %self.config.simulation.pair,
            timeframe = %self.config.simulation.timeframe,
            "paper trading started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(error) = self.poll_once().await {
                        self.fault_count += 1;
                        tracing::error!(%error, "paper trading tick failed, continuing");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!("paper trading stopped");
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Fetches the latest candles and runs the pipeline over each one that
    /// is strictly newer than the last processed timestamp.
    ///
    /// # Errors
    ///
    /// Supplier failures surface here; the run loop treats them as
    /// transient tick faults.
    pub async fn poll_once(&mut self) -> Result<()> {
        let latest = self
            .supplier
            .latest_candles(&self.config.simulation.pair, self.timeframe_minutes)
            .await?;

        for candle in latest {
            if self
                .last_processed
                .is_some_and(|last| candle.timestamp <= last)
            {
                tracing::debug!(timestamp = %candle.timestamp, "skipping already-processed candle");
                continue;
            }

            self.last_processed = Some(candle.timestamp);
            self.history.push_back(candle);
            while self.history.len() > self.config.simulation.history_limit {
                self.history.pop_front();
            }

            if self.history.len() < MIN_CANDLES {
                tracing::debug!(
                    have = self.history.len(),
                    need = MIN_CANDLES,
                    "warming up candle history"
                );
                continue;
            }

            let window: &[Candle] = self.history.make_contiguous();
            let window = window.to_vec();
            if let Err(error) = self.pipeline.process_candle(&window).await {
                self.fault_count += 1;
                tracing::error!(%error, "candle processing fault, skipping");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use rust_decimal::Decimal;
    use std::sync::Mutex;
    use tradesim_core::{DecisionRequest, TradeDecision};

    fn at(minute: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap() + Duration::minutes(minute)
    }

    fn make_candle(minute: i64, close: i64) -> Candle {
        Candle {
            timestamp: at(minute),
            open: Decimal::new(close, 0),
            high: Decimal::new(close + 1, 0),
            low: Decimal::new(close - 1, 0),
            close: Decimal::new(close, 0),
            volume: Decimal::new(1000, 0),
        }
    }

    /// Supplier returning a scripted batch per poll.
    struct ScriptedSupplier {
        batches: Mutex<VecDeque<Vec<Candle>>>,
    }

    #[async_trait]
    impl CandleSupplier for ScriptedSupplier {
        async fn historical_candles(
            &self,
            _pair: &str,
            _timeframe_minutes: u32,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<Candle>> {
            Err(anyhow!("not used"))
        }

        async fn latest_candles(
            &self,
            _pair: &str,
            _timeframe_minutes: u32,
        ) -> Result<Vec<Candle>> {
            Ok(self
                .batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_default())
        }
    }

    struct CountingProvider {
        calls: Mutex<usize>,
    }

    #[async_trait]
    impl DecisionProvider for CountingProvider {
        async fn decide(&self, _request: &DecisionRequest) -> Result<TradeDecision> {
            *self.calls.lock().unwrap() += 1;
            Ok(TradeDecision::hold_fallback("counting"))
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    fn trader_with(
        batches: Vec<Vec<Candle>>,
        provider: Arc<CountingProvider>,
    ) -> PaperTrader {
        let supplier = Arc::new(ScriptedSupplier {
            batches: Mutex::new(batches.into_iter().collect()),
        });
        PaperTrader::new(AppConfig::default(), supplier, provider, None).unwrap()
    }

    #[tokio::test]
    async fn duplicate_latest_candle_is_processed_once() {
        let warmup: Vec<Candle> = (0..50).map(|i| make_candle(i, 100)).collect();
        let repeated = make_candle(50, 101);
        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(0),
        });

        let mut trader = trader_with(
            vec![warmup, vec![repeated.clone()], vec![repeated]],
            provider.clone(),
        );

        trader.poll_once().await.unwrap();
        let after_warmup = *provider.calls.lock().unwrap();

        trader.poll_once().await.unwrap();
        let after_first = *provider.calls.lock().unwrap();
        assert_eq!(after_first, after_warmup + 1);

        // Same timestamp again: no new pipeline run.
        trader.poll_once().await.unwrap();
        assert_eq!(*provider.calls.lock().unwrap(), after_first);
    }

    #[tokio::test]
    async fn history_is_capped_at_the_configured_limit() {
        let mut config = AppConfig::default();
        config.simulation.history_limit = 60;
        let candles: Vec<Candle> = (0..100).map(|i| make_candle(i, 100)).collect();
        let supplier = Arc::new(ScriptedSupplier {
            batches: Mutex::new(VecDeque::from(vec![candles])),
        });
        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(0),
        });

        let mut trader = PaperTrader::new(config, supplier, provider, None).unwrap();
        trader.poll_once().await.unwrap();

        assert_eq!(trader.history.len(), 60);
        assert_eq!(trader.history.front().unwrap().timestamp, at(40));
    }

    #[tokio::test]
    async fn no_trading_before_warmup_floor() {
        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(0),
        });
        let candles: Vec<Candle> = (0..49).map(|i| make_candle(i, 100)).collect();
        let mut trader = trader_with(vec![candles], provider.clone());

        trader.poll_once().await.unwrap();
        assert_eq!(*provider.calls.lock().unwrap(), 0);
    }

    #[test]
    fn malformed_timeframe_is_fatal_at_construction() {
        let mut config = AppConfig::default();
        config.simulation.timeframe = "soon".to_string();
        let supplier = Arc::new(ScriptedSupplier {
            batches: Mutex::new(VecDeque::new()),
        });
        let provider = Arc::new(CountingProvider {
            calls: Mutex::new(0),
        });

        assert!(PaperTrader::new(config, supplier, provider, None).is_err());
    }
}

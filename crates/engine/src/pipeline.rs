//! The per-candle simulation pipeline shared by backtest and paper modes.
//!
//! Single-writer semantics: one pipeline instance processes candles strictly
//! in order, and every aggregate (portfolio, risk state, stats) is mutated
//! only from here. The only suspension points are the decision provider
//! call (bounded by a timeout) and the fire-and-forget dashboard push.

use crate::execution::ExecutionSimulator;
use crate::result::{BacktestResult, DecisionLogEntry};
use crate::tracker::PerformanceTracker;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tradesim_core::{
    AppConfig, Candle, DashboardSink, DashboardUpdate, DecisionProvider, DecisionRequest,
    ExitReason, PositionSide, TradeAction, TradeDecision,
};
use tradesim_indicators::{IndicatorEngine, MarketContextClassifier};
use tradesim_risk::{RiskManager, TradeAssessment};

pub struct SimulationPipeline {
    config: AppConfig,
    indicator_engine: IndicatorEngine,
    risk: RiskManager,
    executor: ExecutionSimulator,
    tracker: PerformanceTracker,
    provider: Arc<dyn DecisionProvider>,
    sink: Option<Arc<dyn DashboardSink>>,
    decisions: Vec<DecisionLogEntry>,
}

impl SimulationPipeline {
    #[must_use]
    pub fn new(
        config: AppConfig,
        provider: Arc<dyn DecisionProvider>,
        sink: Option<Arc<dyn DashboardSink>>,
        start_time: DateTime<Utc>,
    ) -> Self {
        let sim = &config.simulation;
        let executor = ExecutionSimulator::new(
            sim.pair.clone(),
            sim.initial_capital,
            sim.taker_fee,
            sim.slippage,
            start_time,
        );
        let tracker = PerformanceTracker::new(sim.initial_capital, start_time);

        Self {
            indicator_engine: IndicatorEngine::new(config.indicators.clone()),
            risk: RiskManager::new(config.risk.clone()),
            executor,
            tracker,
            provider,
            sink,
            decisions: Vec::new(),
            config,
        }
    }

    #[must_use]
    pub fn executor(&self) -> &ExecutionSimulator {
        &self.executor
    }

    #[must_use]
    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    #[must_use]
    pub fn risk(&self) -> &RiskManager {
        &self.risk
    }

    /// Manually resumes a halted circuit breaker (required when the
    /// recovery window is zero).
    pub fn resume_risk(&mut self) {
        self.risk.resume();
    }

    /// Runs the full pipeline for the newest candle of `window`:
    /// mark-to-market, protective levels, indicators and context, decision,
    /// risk gate, execution, equity tick, dashboard push.
    ///
    /// # Errors
    ///
    /// Any error here is a per-candle fault: the driver logs it, counts it,
    /// and moves on to the next candle.
    pub async fn process_candle(&mut self, window: &[Candle]) -> Result<()> {
        let candle = window.last().context("empty candle window")?.clone();

        self.executor.mark_to_market(&candle);

        if let Some(closed) = self.executor.check_protective_levels(&candle)? {
            self.tracker.record_trade(closed);
        }

        let snapshot = self.indicator_engine.compute(window)?;
        let market_context = MarketContextClassifier::classify(&snapshot, window);

        let request = DecisionRequest {
            pair: self.config.simulation.pair.clone(),
            candle: candle.clone(),
            indicators: snapshot,
            market_context,
            portfolio: self.executor.portfolio().clone(),
            open_position: self.executor.position().cloned(),
            stats: self.tracker.stats().clone(),
            recent_trades: self
                .tracker
                .recent_trades(self.config.simulation.recent_trades_window),
        };

        let decision = self.obtain_decision(&request).await;
        let assessment = self.gate_and_execute(&decision, &candle)?;
        self.decisions.push(DecisionLogEntry {
            timestamp: candle.timestamp,
            decision,
            assessment,
        });

        self.executor.mark_to_market(&candle);
        self.tracker
            .record_equity(candle.timestamp, self.executor.portfolio().total_equity);

        self.push_dashboard(&candle);

        Ok(())
    }

    /// Force-closes any open position against `candle` and ticks equity.
    /// Used at the end of a backtest.
    ///
    /// # Errors
    ///
    /// Propagates close bookkeeping failures.
    pub fn force_close(&mut self, candle: &Candle) -> Result<()> {
        if self.executor.position().is_some() {
            let closed = self
                .executor
                .close_position(candle, ExitReason::EndOfBacktest)?;
            self.tracker.record_trade(closed);
            self.tracker
                .record_equity(candle.timestamp, self.executor.portfolio().total_equity);
        }
        Ok(())
    }

    /// Consumes the pipeline into a persisted result.
    #[must_use]
    pub fn into_result(
        self,
        fault_count: usize,
        duration: Duration,
        start_date: DateTime<Utc>,
        end_date: DateTime<Utc>,
    ) -> BacktestResult {
        BacktestResult {
            config: self.config,
            stats: self.tracker.stats().clone(),
            trades: self.tracker.trades().to_vec(),
            decisions: self.decisions,
            equity_curve: self.tracker.equity_curve().to_vec(),
            fault_count,
            duration_ms: duration.as_millis() as u64,
            start_date,
            end_date,
        }
    }

    /// Asks the provider under the configured timeout; any failure becomes
    /// a zero-confidence HOLD naming the failure.
    async fn obtain_decision(&self, request: &DecisionRequest) -> TradeDecision {
        let timeout = Duration::from_secs(self.config.simulation.decision_timeout_secs);
        match tokio::time::timeout(timeout, self.provider.decide(request)).await {
            Ok(Ok(decision)) => decision.sanitized(),
            Ok(Err(error)) => {
                tracing::warn!(provider = self.provider.name(), %error, "decision provider failed");
                TradeDecision::hold_fallback(format!("decision provider error: {error}"))
            }
            Err(_) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    timeout_secs = timeout.as_secs(),
                    "decision provider timed out"
                );
                TradeDecision::hold_fallback(format!(
                    "decision provider timed out after {}s",
                    timeout.as_secs()
                ))
            }
        }
    }

    fn gate_and_execute(
        &mut self,
        decision: &TradeDecision,
        candle: &Candle,
    ) -> Result<Option<TradeAssessment>> {
        if decision.action == TradeAction::Hold {
            return Ok(None);
        }

        let assessment = self.risk.check_trade(
            decision,
            self.executor.portfolio(),
            self.tracker.stats(),
            self.executor.position(),
            candle.close,
            candle.timestamp,
        );

        match &assessment {
            TradeAssessment::Approved { quantity } => match decision.action {
                TradeAction::Buy if *quantity > Decimal::ZERO => {
                    let entry_estimate =
                        candle.close * (Decimal::ONE + self.config.simulation.slippage);
                    let stop_loss =
                        self.risk
                            .stop_loss(entry_estimate, PositionSide::Long, decision.stop_loss);
                    let take_profit = self.risk.take_profit(
                        entry_estimate,
                        PositionSide::Long,
                        decision.take_profit,
                    );
                    self.executor
                        .open_position(decision, candle, *quantity, stop_loss, take_profit)?;
                }
                TradeAction::Buy => {
                    tracing::debug!("sized to zero, skipping entry");
                }
                TradeAction::Sell => {
                    let closed = self.executor.close_position(candle, ExitReason::Decision)?;
                    self.tracker.record_trade(closed);
                }
                TradeAction::Hold => {}
            },
            TradeAssessment::Rejected { violation } => {
                tracing::info!(%violation, "trade rejected by risk manager");
            }
        }

        Ok(Some(assessment))
    }

    /// Best-effort dashboard push: spawned, never awaited by the pipeline,
    /// failures only logged.
    fn push_dashboard(&self, candle: &Candle) {
        let Some(sink) = self.sink.clone() else {
            return;
        };
        let update = DashboardUpdate {
            stats: self.tracker.stats().clone(),
            trades: self
                .tracker
                .recent_trades(self.config.simulation.recent_trades_window),
            initial_capital: self.tracker.initial_capital(),
            current_price: candle.close,
            timestamp: candle.timestamp,
        };
        tokio::spawn(async move {
            if let Err(error) = sink.push(&update).await {
                tracing::warn!(%error, "dashboard push failed");
            }
        });
    }
}

//! Trade gating: circuit breaker plus per-decision checks.

use crate::sizing::{derive_stop_loss, derive_take_profit, position_size};
use crate::state::{recovery_due, HaltReason, RiskState};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tradesim_core::{
    PerformanceStats, PortfolioState, Position, PositionSide, RiskConfig, TradeAction,
    TradeDecision,
};

/// Minimum closed trades before the Sharpe warning is meaningful.
const SHARPE_WARNING_MIN_TRADES: usize = 20;

/// Why a proposed trade was not allowed. A rejection is a normal gating
/// outcome, not a failure: the candle keeps processing and the run goes on.
#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RiskViolation {
    #[error("trading halted: {reason}")]
    TradingHalted { reason: HaltReason },

    #[error("insufficient cash: need {required}, have {available}")]
    InsufficientCash {
        required: Decimal,
        available: Decimal,
    },

    #[error("a position is already open for {symbol}")]
    PositionAlreadyOpen { symbol: String },

    #[error("no open position to sell")]
    NoOpenPosition,
}

/// Outcome of gating one proposed action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TradeAssessment {
    /// Allowed, with the (possibly clamped) quantity to execute.
    Approved { quantity: Decimal },
    Rejected { violation: RiskViolation },
}

impl TradeAssessment {
    #[must_use]
    pub fn is_approved(&self) -> bool {
        matches!(self, Self::Approved { .. })
    }
}

/// Metric levels already halted on. A trigger re-fires only when its metric
/// worsens past the acknowledged level; otherwise a recovered breaker would
/// re-trip instantly on the same stale streak and never actually resume.
#[derive(Debug, Clone, Copy, Default)]
struct AcknowledgedLevels {
    losses: usize,
    current_drawdown: f64,
    max_drawdown: f64,
}

/// Gates every proposed action through the circuit breaker and per-decision
/// checks, and derives sizes and protective levels for entries.
///
/// Owns the only mutable [`RiskState`]. All timing decisions use the candle
/// timestamp passed by the caller, keeping backtests reproducible.
#[derive(Debug, Clone)]
pub struct RiskManager {
    config: RiskConfig,
    state: RiskState,
    acknowledged: AcknowledgedLevels,
}

impl RiskManager {
    #[must_use]
    pub fn new(config: RiskConfig) -> Self {
        Self {
            config,
            state: RiskState::Active,
            acknowledged: AcknowledgedLevels::default(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &RiskState {
        &self.state
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Manually halts trading. Requires `resume` (or an elapsed recovery
    /// window) to trade again.
    pub fn trip(&mut self, now: DateTime<Utc>) {
        tracing::warn!("circuit breaker manually tripped");
        self.state = RiskState::Halted {
            reason: HaltReason::Manual,
            since: now,
        };
    }

    /// Explicitly returns the breaker to `Active`. The only way back when
    /// the recovery window is zero.
    pub fn resume(&mut self) {
        if self.state.is_halted() {
            tracing::info!("circuit breaker resumed");
        }
        self.state = RiskState::Active;
    }

    /// Gates one proposed action.
    ///
    /// Evaluates lazy auto-recovery first, then the halt triggers in
    /// priority order (consecutive losses, daily-loss proxy, max drawdown),
    /// then the per-decision checks. The position-size ceiling clamps
    /// rather than rejects; a sub-target Sharpe only logs a warning.
    pub fn check_trade(
        &mut self,
        decision: &TradeDecision,
        portfolio: &PortfolioState,
        stats: &PerformanceStats,
        position: Option<&Position>,
        price: Decimal,
        now: DateTime<Utc>,
    ) -> TradeAssessment {
        if let RiskState::Halted { reason, since } = &self.state {
            if recovery_due(*since, now, self.config.recovery_minutes) {
                tracing::info!(%reason, "circuit breaker recovery window elapsed, resuming");
                self.state = RiskState::Active;
            } else {
                return TradeAssessment::Rejected {
                    violation: RiskViolation::TradingHalted {
                        reason: reason.clone(),
                    },
                };
            }
        }

        if let Some(reason) = self.halt_trigger(stats) {
            tracing::warn!(%reason, "circuit breaker tripped");
            self.acknowledge(stats);
            self.state = RiskState::Halted {
                reason: reason.clone(),
                since: now,
            };
            return TradeAssessment::Rejected {
                violation: RiskViolation::TradingHalted { reason },
            };
        }

        if stats.total_trades >= SHARPE_WARNING_MIN_TRADES
            && stats.sharpe_ratio < self.config.min_sharpe
        {
            tracing::warn!(
                sharpe = stats.sharpe_ratio,
                target = self.config.min_sharpe,
                "Sharpe ratio below target"
            );
        }

        match decision.action {
            TradeAction::Hold => TradeAssessment::Approved {
                quantity: Decimal::ZERO,
            },
            TradeAction::Buy => {
                if let Some(open) = position {
                    return TradeAssessment::Rejected {
                        violation: RiskViolation::PositionAlreadyOpen {
                            symbol: open.symbol.clone(),
                        },
                    };
                }

                let quantity = position_size(decision, portfolio, price, &self.config);
                let required = quantity * price;
                if portfolio.cash < required {
                    return TradeAssessment::Rejected {
                        violation: RiskViolation::InsufficientCash {
                            required,
                            available: portfolio.cash,
                        },
                    };
                }

                TradeAssessment::Approved { quantity }
            }
            TradeAction::Sell => position.map_or(
                TradeAssessment::Rejected {
                    violation: RiskViolation::NoOpenPosition,
                },
                |open| TradeAssessment::Approved {
                    quantity: open.quantity,
                },
            ),
        }
    }

    /// Stop-loss level for an entry, honoring an in-band suggestion.
    #[must_use]
    pub fn stop_loss(
        &self,
        entry: Decimal,
        side: PositionSide,
        suggested: Option<Decimal>,
    ) -> Decimal {
        derive_stop_loss(entry, side, suggested, &self.config)
    }

    /// Take-profit level for an entry, honoring an in-band suggestion.
    #[must_use]
    pub fn take_profit(
        &self,
        entry: Decimal,
        side: PositionSide,
        suggested: Option<Decimal>,
    ) -> Decimal {
        derive_take_profit(entry, side, suggested, &self.config)
    }

    fn halt_trigger(&mut self, stats: &PerformanceStats) -> Option<HaltReason> {
        // A recovered streak or drawdown clears its acknowledgment so the
        // trigger can fire afresh next time.
        if stats.consecutive_losses < self.acknowledged.losses {
            self.acknowledged.losses = 0;
        }
        if stats.current_drawdown < self.acknowledged.current_drawdown {
            self.acknowledged.current_drawdown = 0.0;
        }

        if self.config.max_consecutive_losses > 0
            && stats.consecutive_losses >= self.config.max_consecutive_losses
            && stats.consecutive_losses > self.acknowledged.losses
        {
            return Some(HaltReason::ConsecutiveLosses {
                count: stats.consecutive_losses,
            });
        }
        if stats.current_drawdown >= self.config.daily_loss_limit
            && stats.current_drawdown > self.acknowledged.current_drawdown
        {
            return Some(HaltReason::DailyLossLimit {
                drawdown: stats.current_drawdown,
            });
        }
        if stats.max_drawdown >= self.config.max_drawdown_limit
            && stats.max_drawdown > self.acknowledged.max_drawdown
        {
            return Some(HaltReason::MaxDrawdown {
                drawdown: stats.max_drawdown,
            });
        }
        None
    }

    fn acknowledge(&mut self, stats: &PerformanceStats) {
        self.acknowledged = AcknowledgedLevels {
            losses: stats.consecutive_losses,
            current_drawdown: stats.current_drawdown,
            max_drawdown: stats.max_drawdown,
        };
    }
}

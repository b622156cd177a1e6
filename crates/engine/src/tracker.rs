//! Incremental performance statistics over an append-only trade log and
//! equity curve.

use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tradesim_core::{EquityPoint, PerformanceStats, TradeRecord};
use tradesim_indicators::math::{mean, stddev_pop};

pub struct PerformanceTracker {
    initial_capital: Decimal,
    trades: Vec<TradeRecord>,
    equity_curve: Vec<EquityPoint>,
    stats: PerformanceStats,
    /// Per-trade PnL percentages, the Sharpe ratio inputs.
    trade_returns: Vec<f64>,
}

impl PerformanceTracker {
    /// Seeds the equity curve with the initial capital at `start_time`.
    #[must_use]
    pub fn new(initial_capital: Decimal, start_time: DateTime<Utc>) -> Self {
        Self {
            initial_capital,
            trades: Vec::new(),
            equity_curve: vec![EquityPoint {
                timestamp: start_time,
                equity: initial_capital,
            }],
            stats: PerformanceStats::new(initial_capital),
            trade_returns: Vec::new(),
        }
    }

    #[must_use]
    pub fn initial_capital(&self) -> Decimal {
        self.initial_capital
    }

    #[must_use]
    pub fn stats(&self) -> &PerformanceStats {
        &self.stats
    }

    #[must_use]
    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    /// The most recent `count` closed trades, oldest first.
    #[must_use]
    pub fn recent_trades(&self, count: usize) -> Vec<TradeRecord> {
        let start = self.trades.len().saturating_sub(count);
        self.trades[start..].to_vec()
    }

    #[must_use]
    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Appends one equity point and refreshes drawdown bookkeeping. Called
    /// on every processed candle, trade or no trade, so drawdown tracking
    /// stays continuous.
    pub fn record_equity(&mut self, timestamp: DateTime<Utc>, equity: Decimal) {
        self.equity_curve.push(EquityPoint { timestamp, equity });

        self.stats.current_equity = equity;
        if equity > self.stats.peak_equity {
            self.stats.peak_equity = equity;
        }

        let peak = self.stats.peak_equity;
        self.stats.current_drawdown = if peak > Decimal::ZERO {
            ((peak - equity) / peak).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };
        if self.stats.current_drawdown > self.stats.max_drawdown {
            self.stats.max_drawdown = self.stats.current_drawdown;
        }
    }

    /// Appends a closed trade and recomputes the aggregate statistics.
    /// Open-half records are ignored; only closes change the stats.
    pub fn record_trade(&mut self, record: TradeRecord) {
        let Some(exit) = record.exit.clone() else {
            tracing::debug!(id = %record.id, "ignoring open-half trade record");
            return;
        };

        self.trade_returns.push(exit.pnl_percentage);
        self.trades.push(record);

        let stats = &mut self.stats;
        stats.total_trades += 1;
        stats.total_pnl += exit.pnl;

        if exit.is_win {
            stats.winning_trades += 1;
            stats.gross_profit += exit.pnl;
            stats.consecutive_wins += 1;
            stats.consecutive_losses = 0;
            if stats.consecutive_wins > stats.max_consecutive_wins {
                stats.max_consecutive_wins = stats.consecutive_wins;
            }
        } else {
            stats.losing_trades += 1;
            stats.gross_loss += exit.pnl.abs();
            stats.consecutive_losses += 1;
            stats.consecutive_wins = 0;
            if stats.consecutive_losses > stats.max_consecutive_losses {
                stats.max_consecutive_losses = stats.consecutive_losses;
            }
        }

        stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64 * 100.0;

        stats.profit_factor = if stats.gross_loss > Decimal::ZERO {
            (stats.gross_profit / stats.gross_loss).to_f64().unwrap_or(0.0)
        } else {
            0.0
        };

        stats.sharpe_ratio = sharpe(&self.trade_returns);

        stats.expectancy = stats.total_pnl / Decimal::from(stats.total_trades as u64);

        stats.average_win = if stats.winning_trades > 0 {
            stats.gross_profit / Decimal::from(stats.winning_trades as u64)
        } else {
            Decimal::ZERO
        };
        stats.average_loss = if stats.losing_trades > 0 {
            stats.gross_loss / Decimal::from(stats.losing_trades as u64)
        } else {
            Decimal::ZERO
        };
        stats.average_risk_reward = if stats.average_loss > Decimal::ZERO {
            (stats.average_win / stats.average_loss)
                .to_f64()
                .unwrap_or(0.0)
                .abs()
        } else {
            0.0
        };
    }
}

/// Mean over population standard deviation of per-trade returns. Zero with
/// fewer than two trades or zero dispersion. Intentionally not annualized.
fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let deviation = stddev_pop(returns);
    if deviation == 0.0 {
        return 0.0;
    }
    mean(returns) / deviation
}

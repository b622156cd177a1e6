use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Aggregate performance statistics, recomputed by the tracker on every
/// closed trade and every equity tick. Callers never mutate this directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percentage in [0, 100].
    pub win_rate: f64,
    pub total_pnl: Decimal,
    pub gross_profit: Decimal,
    /// Positive magnitude of accumulated losses.
    pub gross_loss: Decimal,
    /// Gross profit over gross loss; 0 when gross loss is 0.
    pub profit_factor: f64,
    /// Mean over population standard deviation of per-trade PnL percentages.
    /// Not annualized; 0 with fewer than two trades or zero dispersion.
    pub sharpe_ratio: f64,
    /// Fraction of equity lost from the running peak, in [0, 1].
    pub current_drawdown: f64,
    /// Largest drawdown ever observed, in [0, 1].
    pub max_drawdown: f64,
    pub peak_equity: Decimal,
    pub current_equity: Decimal,
    pub consecutive_wins: usize,
    pub consecutive_losses: usize,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
    /// Mean PnL per trade.
    pub expectancy: Decimal,
    pub average_win: Decimal,
    /// Positive magnitude.
    pub average_loss: Decimal,
    /// |average win / average loss|; 0 when there are no losses.
    pub average_risk_reward: f64,
}

impl PerformanceStats {
    /// Stats for a fresh run: no trades, equity pinned to initial capital.
    #[must_use]
    pub fn new(initial_capital: Decimal) -> Self {
        Self {
            total_trades: 0,
            winning_trades: 0,
            losing_trades: 0,
            win_rate: 0.0,
            total_pnl: Decimal::ZERO,
            gross_profit: Decimal::ZERO,
            gross_loss: Decimal::ZERO,
            profit_factor: 0.0,
            sharpe_ratio: 0.0,
            current_drawdown: 0.0,
            max_drawdown: 0.0,
            peak_equity: initial_capital,
            current_equity: initial_capital,
            consecutive_wins: 0,
            consecutive_losses: 0,
            max_consecutive_wins: 0,
            max_consecutive_losses: 0,
            expectancy: Decimal::ZERO,
            average_win: Decimal::ZERO,
            average_loss: Decimal::ZERO,
            average_risk_reward: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn fresh_stats_pin_equity_to_initial_capital() {
        let stats = PerformanceStats::new(dec!(10000));
        assert_eq!(stats.total_trades, 0);
        assert_eq!(stats.peak_equity, dec!(10000));
        assert_eq!(stats.current_equity, dec!(10000));
        assert!((stats.sharpe_ratio - 0.0).abs() < f64::EPSILON);
    }
}

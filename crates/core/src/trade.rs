use crate::decision::TradeAction;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Immutable record of one simulated trade.
///
/// The open half is written when a position is opened; `exit` is filled in
/// exactly once when the position closes. The log itself is append-only and
/// owned by the performance tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub action: TradeAction,
    pub quantity: Decimal,
    pub price: Decimal,
    /// Gross entry value (price x quantity), before fees.
    pub value: Decimal,
    pub fee: Decimal,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub reasoning: String,
    pub exit: Option<TradeExit>,
}

/// Close half of a trade record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeExit {
    pub exit_time: DateTime<Utc>,
    pub exit_price: Decimal,
    /// Realized PnL net of both entry and exit fees.
    pub pnl: Decimal,
    /// PnL relative to the total entry cost, as a percentage.
    pub pnl_percentage: f64,
    pub holding_period_secs: i64,
    pub is_win: bool,
    pub reason: ExitReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    Decision,
    StopLoss,
    TakeProfit,
    EndOfBacktest,
}

impl TradeRecord {
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.exit.is_some()
    }

    /// Realized PnL, if the trade has closed.
    #[must_use]
    pub fn pnl(&self) -> Option<Decimal> {
        self.exit.as_ref().map(|e| e.pnl)
    }

    #[must_use]
    pub fn is_win(&self) -> bool {
        self.exit.as_ref().is_some_and(|e| e.is_win)
    }
}

/// One point of the equity curve. The curve is strictly append-only and
/// monotonic in timestamp; its first element is seeded with the initial
/// capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: DateTime<Utc>,
    pub equity: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn open_half() -> TradeRecord {
        TradeRecord {
            id: "t-1".to_string(),
            timestamp: Utc::now(),
            action: TradeAction::Buy,
            quantity: dec!(1),
            price: dec!(100),
            value: dec!(100),
            fee: dec!(0.26),
            stop_loss: Some(dec!(98)),
            take_profit: Some(dec!(104)),
            reasoning: "test entry".to_string(),
            exit: None,
        }
    }

    #[test]
    fn open_trade_has_no_pnl() {
        let trade = open_half();
        assert!(!trade.is_closed());
        assert!(trade.pnl().is_none());
        assert!(!trade.is_win());
    }

    #[test]
    fn closed_trade_reports_pnl_and_win() {
        let mut trade = open_half();
        trade.exit = Some(TradeExit {
            exit_time: trade.timestamp,
            exit_price: dec!(104),
            pnl: dec!(3.48),
            pnl_percentage: 3.47,
            holding_period_secs: 300,
            is_win: true,
            reason: ExitReason::TakeProfit,
        });
        assert!(trade.is_closed());
        assert_eq!(trade.pnl(), Some(dec!(3.48)));
        assert!(trade.is_win());
    }
}

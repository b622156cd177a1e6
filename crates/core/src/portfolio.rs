use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionSide {
    Long,
    Short,
}

/// The single open position. Owned exclusively by the execution simulator:
/// created on an open decision, marked on every candle while open, and
/// converted to a closed trade record on exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub entry_price: Decimal,
    pub quantity: Decimal,
    pub side: PositionSide,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: Decimal,
    pub take_profit: Decimal,
    pub current_price: Decimal,
    pub unrealized_pnl: Decimal,
}

impl Position {
    /// Marks the position to the given price, updating unrealized PnL.
    pub fn mark(&mut self, price: Decimal) {
        self.current_price = price;
        self.unrealized_pnl = match self.side {
            PositionSide::Long => (price - self.entry_price) * self.quantity,
            PositionSide::Short => (self.entry_price - price) * self.quantity,
        };
    }

    #[must_use]
    pub fn market_value(&self) -> Decimal {
        self.quantity * self.current_price
    }
}

/// Mutable portfolio aggregate: cash plus holdings, with total equity kept in
/// sync by the execution simulator on every mark-to-market.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioState {
    pub cash: Decimal,
    /// Symbol to quantity. At most one nonzero entry in the single-position
    /// design.
    pub holdings: HashMap<String, Decimal>,
    pub total_equity: Decimal,
    pub timestamp: DateTime<Utc>,
}

impl PortfolioState {
    #[must_use]
    pub fn new(initial_capital: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            cash: initial_capital,
            holdings: HashMap::new(),
            total_equity: initial_capital,
            timestamp,
        }
    }

    #[must_use]
    pub fn holding(&self, symbol: &str) -> Decimal {
        self.holdings.get(symbol).copied().unwrap_or(Decimal::ZERO)
    }
}

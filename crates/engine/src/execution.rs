//! Position lifecycle and simulated order execution.
//!
//! Flat -> Open -> Flat, exactly one open position per symbol. Fees and
//! slippage are deterministic multiplicative constants, so a backtest over
//! the same inputs reproduces exactly.

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use tradesim_core::{
    Candle, ExitReason, PortfolioState, Position, PositionSide, TradeAction, TradeDecision,
    TradeExit, TradeRecord,
};

pub struct ExecutionSimulator {
    symbol: String,
    taker_fee: Decimal,
    slippage: Decimal,
    portfolio: PortfolioState,
    position: Option<Position>,
    /// Open half of the current trade, completed on close.
    entry_record: Option<TradeRecord>,
}

impl ExecutionSimulator {
    #[must_use]
    pub fn new(
        symbol: String,
        initial_capital: Decimal,
        taker_fee: Decimal,
        slippage: Decimal,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            symbol,
            taker_fee,
            slippage,
            portfolio: PortfolioState::new(initial_capital, start_time),
            position: None,
            entry_record: None,
        }
    }

    #[must_use]
    pub fn portfolio(&self) -> &PortfolioState {
        &self.portfolio
    }

    #[must_use]
    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    /// Marks any open position to the candle close and refreshes total
    /// equity and the portfolio timestamp.
    pub fn mark_to_market(&mut self, candle: &Candle) {
        if let Some(position) = &mut self.position {
            position.mark(candle.close);
            self.portfolio.total_equity = self.portfolio.cash + position.market_value();
        } else {
            self.portfolio.total_equity = self.portfolio.cash;
        }
        self.portfolio.timestamp = candle.timestamp;
    }

    /// Force-closes the position if the candle close breached the stop-loss
    /// or take-profit level. Returns the closed trade, if any.
    ///
    /// # Errors
    ///
    /// Propagates close bookkeeping failures.
    pub fn check_protective_levels(&mut self, candle: &Candle) -> Result<Option<TradeRecord>> {
        let Some(position) = &self.position else {
            return Ok(None);
        };

        let reason = if candle.close <= position.stop_loss {
            Some(ExitReason::StopLoss)
        } else if candle.close >= position.take_profit {
            Some(ExitReason::TakeProfit)
        } else {
            None
        };

        match reason {
            Some(reason) => {
                tracing::info!(
                    symbol = %self.symbol,
                    close = %candle.close,
                    ?reason,
                    "protective level hit, force closing"
                );
                self.close_position(candle, reason).map(Some)
            }
            None => Ok(None),
        }
    }

    /// Opens a long position at the candle close adjusted for slippage,
    /// debiting cash by value plus taker fee.
    ///
    /// # Errors
    ///
    /// Fails if a position is already open, the quantity is not positive,
    /// or cash cannot cover value plus fee. The risk gate normally filters
    /// these; hitting one here counts as a per-candle fault.
    pub fn open_position(
        &mut self,
        decision: &TradeDecision,
        candle: &Candle,
        quantity: Decimal,
        stop_loss: Decimal,
        take_profit: Decimal,
    ) -> Result<TradeRecord> {
        if self.position.is_some() {
            bail!("position already open for {}", self.symbol);
        }
        if quantity <= Decimal::ZERO {
            bail!("cannot open a position with quantity {quantity}");
        }

        let entry_price = candle.close * (Decimal::ONE + self.slippage);
        let value = entry_price * quantity;
        let fee = value * self.taker_fee;
        let total_cost = value + fee;
        if self.portfolio.cash < total_cost {
            bail!(
                "cash {} cannot cover entry cost {total_cost}",
                self.portfolio.cash
            );
        }

        self.portfolio.cash -= total_cost;
        self.portfolio
            .holdings
            .insert(self.symbol.clone(), quantity);

        let mut position = Position {
            symbol: self.symbol.clone(),
            entry_price,
            quantity,
            side: PositionSide::Long,
            entry_time: candle.timestamp,
            stop_loss,
            take_profit,
            current_price: entry_price,
            unrealized_pnl: Decimal::ZERO,
        };
        position.mark(candle.close);
        self.portfolio.total_equity = self.portfolio.cash + position.market_value();
        self.position = Some(position);

        let record = TradeRecord {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: candle.timestamp,
            action: TradeAction::Buy,
            quantity,
            price: entry_price,
            value,
            fee,
            stop_loss: Some(stop_loss),
            take_profit: Some(take_profit),
            reasoning: decision.reasoning.clone(),
            exit: None,
        };
        self.entry_record = Some(record.clone());

        tracing::info!(
            symbol = %self.symbol,
            price = %entry_price,
            %quantity,
            %fee,
            "opened position"
        );

        Ok(record)
    }

    /// Closes the open position at the candle close adjusted for slippage,
    /// crediting cash with the exit value net of the exit fee. Realized PnL
    /// is measured against the full entry cost (value plus entry fee).
    ///
    /// # Errors
    ///
    /// Fails if no position is open.
    pub fn close_position(&mut self, candle: &Candle, reason: ExitReason) -> Result<TradeRecord> {
        let position = self.position.take().context("no open position to close")?;
        let entry = self
            .entry_record
            .take()
            .context("open position without an entry record")?;

        let exit_price = candle.close * (Decimal::ONE - self.slippage);
        let exit_value = exit_price * position.quantity;
        let exit_fee = exit_value * self.taker_fee;
        let cost_basis = entry.value + entry.fee;
        let pnl = exit_value - exit_fee - cost_basis;
        let pnl_percentage = if cost_basis > Decimal::ZERO {
            (pnl / cost_basis * Decimal::ONE_HUNDRED)
                .to_f64()
                .unwrap_or(0.0)
        } else {
            0.0
        };

        self.portfolio.cash += exit_value - exit_fee;
        self.portfolio.holdings.remove(&self.symbol);
        self.portfolio.total_equity = self.portfolio.cash;
        self.portfolio.timestamp = candle.timestamp;

        let holding_period_secs = (candle.timestamp - position.entry_time).num_seconds();
        let record = TradeRecord {
            exit: Some(TradeExit {
                exit_time: candle.timestamp,
                exit_price,
                pnl,
                pnl_percentage,
                holding_period_secs,
                is_win: pnl > Decimal::ZERO,
                reason,
            }),
            ..entry
        };

        tracing::info!(
            symbol = %self.symbol,
            price = %exit_price,
            %pnl,
            ?reason,
            "closed position"
        );

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn make_candle(close: Decimal, minute: i64) -> Candle {
        Candle {
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
                + chrono::Duration::minutes(minute),
            open: close,
            high: close + dec!(1),
            low: close - dec!(1),
            close,
            volume: dec!(1000),
        }
    }

    fn buy_decision() -> TradeDecision {
        TradeDecision {
            action: TradeAction::Buy,
            confidence: 0.9,
            quantity: None,
            stop_loss: None,
            take_profit: None,
            reasoning: "entry".to_string(),
        }
    }

    fn simulator(fee: Decimal, slippage: Decimal) -> ExecutionSimulator {
        ExecutionSimulator::new(
            "BTC/USD".to_string(),
            dec!(10000),
            fee,
            slippage,
            make_candle(dec!(100), 0).timestamp,
        )
    }

    // ==================== Open ====================

    #[test]
    fn open_applies_slippage_and_fee() {
        let mut sim = simulator(dec!(0.001), dec!(0.01));
        let candle = make_candle(dec!(100), 0);

        let record = sim
            .open_position(&buy_decision(), &candle, dec!(10), dec!(95), dec!(110))
            .unwrap();

        assert_eq!(record.price, dec!(101)); // 100 * 1.01
        assert_eq!(record.value, dec!(1010));
        assert_eq!(record.fee, dec!(1.010));
        assert_eq!(sim.portfolio().cash, dec!(10000) - dec!(1011.010));
        assert_eq!(sim.portfolio().holding("BTC/USD"), dec!(10));
        assert!(sim.position().is_some());
    }

    #[test]
    fn cannot_open_twice() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        let candle = make_candle(dec!(100), 0);
        sim.open_position(&buy_decision(), &candle, dec!(1), dec!(95), dec!(110))
            .unwrap();
        assert!(sim
            .open_position(&buy_decision(), &candle, dec!(1), dec!(95), dec!(110))
            .is_err());
    }

    #[test]
    fn cannot_open_beyond_cash() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        let candle = make_candle(dec!(100), 0);
        assert!(sim
            .open_position(&buy_decision(), &candle, dec!(200), dec!(95), dec!(110))
            .is_err());
    }

    // ==================== Close ====================

    #[test]
    fn round_trip_at_same_price_loses_exactly_the_fees() {
        let fee = dec!(0.001);
        let mut sim = simulator(fee, Decimal::ZERO);
        let candle = make_candle(dec!(100), 0);

        let entry = sim
            .open_position(&buy_decision(), &candle, dec!(10), dec!(95), dec!(110))
            .unwrap();
        let closed = sim
            .close_position(&make_candle(dec!(100), 5), ExitReason::Decision)
            .unwrap();

        let exit = closed.exit.unwrap();
        let expected = -(entry.fee + dec!(1000) * fee); // entry fee + exit fee
        assert_eq!(exit.pnl, expected);
        assert!(exit.pnl < Decimal::ZERO, "fees make a flat round trip a loss");
        assert!(!exit.is_win);
        assert_eq!(sim.portfolio().cash, dec!(10000) + expected);
        assert!(sim.position().is_none());
    }

    #[test]
    fn profitable_close_credits_cash_and_records_win() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        sim.open_position(
            &buy_decision(),
            &make_candle(dec!(100), 0),
            dec!(10),
            dec!(95),
            dec!(200),
        )
        .unwrap();

        let closed = sim
            .close_position(&make_candle(dec!(110), 10), ExitReason::Decision)
            .unwrap();
        let exit = closed.exit.unwrap();

        assert_eq!(exit.pnl, dec!(100)); // (110 - 100) * 10
        assert!(exit.is_win);
        assert!((exit.pnl_percentage - 10.0).abs() < 1e-9);
        assert_eq!(exit.holding_period_secs, 600);
        assert_eq!(sim.portfolio().cash, dec!(10100));
        assert_eq!(sim.portfolio().total_equity, dec!(10100));
    }

    #[test]
    fn close_without_position_fails() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        assert!(sim
            .close_position(&make_candle(dec!(100), 0), ExitReason::Decision)
            .is_err());
    }

    // ==================== Protective levels ====================

    #[test]
    fn stop_loss_force_closes() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        sim.open_position(
            &buy_decision(),
            &make_candle(dec!(100), 0),
            dec!(10),
            dec!(95),
            dec!(110),
        )
        .unwrap();

        let closed = sim
            .check_protective_levels(&make_candle(dec!(94), 5))
            .unwrap()
            .expect("stop should trigger");
        assert_eq!(closed.exit.unwrap().reason, ExitReason::StopLoss);
        assert!(sim.position().is_none());
    }

    #[test]
    fn take_profit_force_closes() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        sim.open_position(
            &buy_decision(),
            &make_candle(dec!(100), 0),
            dec!(10),
            dec!(95),
            dec!(110),
        )
        .unwrap();

        let closed = sim
            .check_protective_levels(&make_candle(dec!(111), 5))
            .unwrap()
            .expect("target should trigger");
        let exit = closed.exit.unwrap();
        assert_eq!(exit.reason, ExitReason::TakeProfit);
        assert!(exit.is_win);
    }

    #[test]
    fn in_range_close_only_marks() {
        let mut sim = simulator(Decimal::ZERO, Decimal::ZERO);
        sim.open_position(
            &buy_decision(),
            &make_candle(dec!(100), 0),
            dec!(10),
            dec!(95),
            dec!(110),
        )
        .unwrap();

        assert!(sim
            .check_protective_levels(&make_candle(dec!(105), 5))
            .unwrap()
            .is_none());

        sim.mark_to_market(&make_candle(dec!(105), 5));
        let position = sim.position().unwrap();
        assert_eq!(position.unrealized_pnl, dec!(50));
        assert_eq!(sim.portfolio().total_equity, dec!(9000) + dec!(1050));
    }
}

use crate::candle::Candle;
use crate::context::MarketContext;
use crate::portfolio::{PortfolioState, Position};
use crate::snapshot::IndicatorSnapshot;
use crate::stats::PerformanceStats;
use crate::trade::TradeRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeAction {
    Buy,
    Sell,
    Hold,
}

/// A proposed action from the decision provider.
///
/// The provider is an external collaborator; the engine validates the
/// proposal through the risk manager before anything is executed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeDecision {
    pub action: TradeAction,
    /// Provider confidence in [0, 1].
    pub confidence: f64,
    /// Suggested cash fraction in [0, 1], if the provider sizes the trade.
    pub quantity: Option<f64>,
    pub stop_loss: Option<Decimal>,
    pub take_profit: Option<Decimal>,
    pub reasoning: String,
}

impl TradeDecision {
    /// Zero-confidence HOLD substituted when the provider fails or times out.
    #[must_use]
    pub fn hold_fallback(reason: impl Into<String>) -> Self {
        Self {
            action: TradeAction::Hold,
            confidence: 0.0,
            quantity: None,
            stop_loss: None,
            take_profit: None,
            reasoning: reason.into(),
        }
    }

    /// Clamps confidence and suggested quantity into [0, 1]. Providers are
    /// external; their output is not trusted to stay in range.
    #[must_use]
    pub fn sanitized(mut self) -> Self {
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self.quantity = self.quantity.map(|q| q.clamp(0.0, 1.0));
        self
    }
}

/// Everything the decision provider sees for one candle: market data,
/// indicators, regime, portfolio, open position, running stats, and the
/// most recent closed trades.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub pair: String,
    pub candle: Candle,
    pub indicators: IndicatorSnapshot,
    pub market_context: MarketContext,
    pub portfolio: PortfolioState,
    pub open_position: Option<Position>,
    pub stats: PerformanceStats,
    /// Last few closed trades, most recent last.
    pub recent_trades: Vec<TradeRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn hold_fallback_carries_zero_confidence() {
        let decision = TradeDecision::hold_fallback("provider timed out");
        assert_eq!(decision.action, TradeAction::Hold);
        assert!((decision.confidence - 0.0).abs() < f64::EPSILON);
        assert!(decision.quantity.is_none());
        assert!(decision.reasoning.contains("timed out"));
    }

    #[test]
    fn sanitized_clamps_out_of_range_values() {
        let decision = TradeDecision {
            action: TradeAction::Buy,
            confidence: 1.7,
            quantity: Some(-0.3),
            stop_loss: Some(dec!(95)),
            take_profit: None,
            reasoning: String::new(),
        }
        .sanitized();

        assert!((decision.confidence - 1.0).abs() < f64::EPSILON);
        assert!((decision.quantity.unwrap() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn action_serializes_uppercase() {
        let json = serde_json::to_string(&TradeAction::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
    }
}

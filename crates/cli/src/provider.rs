//! Built-in RSI threshold provider.
//!
//! A stand-in for the external decision service so the simulator can run
//! self-contained: buy oversold when flat, sell overbought when long,
//! otherwise hold. The engine treats it like any other provider, timeout
//! and fallback included.

use anyhow::Result;
use async_trait::async_trait;
use tradesim_core::{DecisionProvider, DecisionRequest, TradeAction, TradeDecision};

pub struct RsiThresholdProvider {
    oversold: f64,
    overbought: f64,
}

impl RsiThresholdProvider {
    #[must_use]
    pub fn new(oversold: f64, overbought: f64) -> Self {
        Self {
            oversold,
            overbought,
        }
    }
}

impl Default for RsiThresholdProvider {
    fn default() -> Self {
        Self::new(30.0, 70.0)
    }
}

#[async_trait]
impl DecisionProvider for RsiThresholdProvider {
    async fn decide(&self, request: &DecisionRequest) -> Result<TradeDecision> {
        let rsi = request.indicators.rsi;

        let decision = match &request.open_position {
            None if rsi < self.oversold => TradeDecision {
                action: TradeAction::Buy,
                confidence: ((self.oversold - rsi) / self.oversold).clamp(0.0, 1.0),
                quantity: None,
                stop_loss: None,
                take_profit: None,
                reasoning: format!("RSI {rsi:.1} below oversold threshold {}", self.oversold),
            },
            Some(_) if rsi > self.overbought => TradeDecision {
                action: TradeAction::Sell,
                confidence: ((rsi - self.overbought) / (100.0 - self.overbought)).clamp(0.0, 1.0),
                quantity: None,
                stop_loss: None,
                take_profit: None,
                reasoning: format!("RSI {rsi:.1} above overbought threshold {}", self.overbought),
            },
            _ => TradeDecision::hold_fallback(format!("RSI {rsi:.1} inside neutral band")),
        };

        Ok(decision)
    }

    fn name(&self) -> &str {
        "rsi-threshold"
    }
}

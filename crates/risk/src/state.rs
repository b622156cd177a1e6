//! Circuit-breaker state machine.
//!
//! Two states: `Active` and `Halted { reason, since }`. Recovery is decided
//! by a pure function of the candle timestamp, never the wall clock, so a
//! backtest that trips the breaker replays identically.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the circuit breaker halted trading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HaltReason {
    ConsecutiveLosses { count: usize },
    DailyLossLimit { drawdown: f64 },
    MaxDrawdown { drawdown: f64 },
    Manual,
}

impl fmt::Display for HaltReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConsecutiveLosses { count } => {
                write!(f, "{count} consecutive losing trades")
            }
            Self::DailyLossLimit { drawdown } => {
                write!(f, "current drawdown {:.2}% hit the daily loss limit", drawdown * 100.0)
            }
            Self::MaxDrawdown { drawdown } => {
                write!(f, "max drawdown {:.2}% hit the ceiling", drawdown * 100.0)
            }
            Self::Manual => write!(f, "manually tripped"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RiskState {
    Active,
    Halted {
        reason: HaltReason,
        since: DateTime<Utc>,
    },
}

impl RiskState {
    #[must_use]
    pub fn is_halted(&self) -> bool {
        matches!(self, Self::Halted { .. })
    }
}

/// Whether a halt that started at `since` has served its recovery window by
/// `now`. A zero window never auto-recovers; it requires an explicit resume.
#[must_use]
pub fn recovery_due(since: DateTime<Utc>, now: DateTime<Utc>, recovery_minutes: i64) -> bool {
    recovery_minutes > 0 && now - since >= Duration::minutes(recovery_minutes)
}

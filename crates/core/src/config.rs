use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
    pub risk: RiskConfig,
    pub indicators: IndicatorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Trading pair, e.g. "BTC/USD".
    pub pair: String,
    /// Candle timeframe string, e.g. "5m". Parsed with `parse_timeframe`;
    /// malformed values are fatal.
    pub timeframe: String,
    pub initial_capital: Decimal,
    /// Taker fee as a fraction of trade value.
    pub taker_fee: Decimal,
    /// Simulated slippage as a fraction of price.
    pub slippage: Decimal,
    /// Timeout for the external decision provider, in seconds.
    pub decision_timeout_secs: u64,
    /// Rolling candle history cap in paper-trading mode.
    pub history_limit: usize,
    /// How many recent closed trades the decision provider sees.
    pub recent_trades_window: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            pair: "BTC/USD".to_string(),
            timeframe: "5m".to_string(),
            initial_capital: Decimal::from(10_000),
            taker_fee: Decimal::new(26, 4),  // 0.26%
            slippage: Decimal::new(10, 4),   // 0.10%
            decision_timeout_secs: 30,
            history_limit: 500,
            recent_trades_window: 5,
        }
    }
}

/// Risk thresholds for the circuit breaker, sizing, and protective levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fraction of equity risked per trade (stop distance based sizing).
    pub max_risk_fraction: f64,
    /// Hard cap on position value as a fraction of equity.
    pub max_position_fraction: f64,
    /// Default stop distance as a fraction of entry price.
    pub stop_loss_fraction: f64,
    /// Default take-profit distance as a fraction of entry price.
    pub take_profit_fraction: f64,
    /// Consecutive losing trades that trip the breaker.
    pub max_consecutive_losses: usize,
    /// Current-drawdown fraction that trips the breaker (daily-loss proxy).
    pub daily_loss_limit: f64,
    /// Max-drawdown fraction that trips the breaker.
    pub max_drawdown_limit: f64,
    /// Auto-recovery window in minutes; 0 requires an explicit resume.
    pub recovery_minutes: i64,
    /// Sharpe ratio below this only logs a warning (needs >= 20 trades).
    pub min_sharpe: f64,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            max_risk_fraction: 0.02,
            max_position_fraction: 0.20,
            stop_loss_fraction: 0.02,
            take_profit_fraction: 0.04,
            max_consecutive_losses: 3,
            daily_loss_limit: 0.05,
            max_drawdown_limit: 0.15,
            recovery_minutes: 60,
            min_sharpe: 0.5,
        }
    }
}

impl RiskConfig {
    #[must_use]
    pub fn with_max_consecutive_losses(mut self, losses: usize) -> Self {
        self.max_consecutive_losses = losses;
        self
    }

    #[must_use]
    pub fn with_daily_loss_limit(mut self, limit: f64) -> Self {
        self.daily_loss_limit = limit;
        self
    }

    #[must_use]
    pub fn with_max_drawdown_limit(mut self, limit: f64) -> Self {
        self.max_drawdown_limit = limit;
        self
    }

    #[must_use]
    pub fn with_recovery_minutes(mut self, minutes: i64) -> Self {
        self.recovery_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_position_fractions(mut self, risk: f64, max_position: f64) -> Self {
        self.max_risk_fraction = risk;
        self.max_position_fraction = max_position;
        self
    }
}

/// How the MACD signal line is derived.
///
/// `Scaled` preserves the engine's documented approximation (signal =
/// factor x MACD) rather than a true EMA of the MACD series; `Ema` is the
/// textbook variant for callers that need parity with standard charting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MacdSignalMode {
    Scaled { factor: f64 },
    Ema { period: usize },
}

impl Default for MacdSignalMode {
    fn default() -> Self {
        Self::Scaled { factor: 0.9 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub rsi_period: usize,
    pub sma_short_period: usize,
    pub sma_long_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub bollinger_period: usize,
    pub bollinger_stddev: f64,
    pub atr_period: usize,
    pub keltner_period: usize,
    pub keltner_multiplier: f64,
    pub macd_signal: MacdSignalMode,
    pub volume_profile_candles: usize,
    pub volume_profile_buckets: usize,
    /// Fraction of total volume the value area must enclose.
    pub value_area_fraction: f64,
    pub market_delta_lookback: usize,
    pub enable_vwap: bool,
    pub enable_keltner: bool,
    pub enable_volume_profile: bool,
    pub enable_market_delta: bool,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            sma_short_period: 20,
            sma_long_period: 50,
            ema_fast_period: 12,
            ema_slow_period: 26,
            bollinger_period: 20,
            bollinger_stddev: 2.0,
            atr_period: 14,
            keltner_period: 20,
            keltner_multiplier: 1.5,
            macd_signal: MacdSignalMode::default(),
            volume_profile_candles: 50,
            volume_profile_buckets: 20,
            value_area_fraction: 0.70,
            market_delta_lookback: 20,
            enable_vwap: true,
            enable_keltner: true,
            enable_volume_profile: true,
            enable_market_delta: true,
        }
    }
}

/// Minimum candle window every computation path assumes. RSI seeding, the
/// long SMA, and the volume profile all need this floor.
pub const MIN_CANDLES: usize = 50;

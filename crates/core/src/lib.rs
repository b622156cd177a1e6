pub mod candle;
pub mod config;
pub mod config_loader;
pub mod context;
pub mod decision;
pub mod error;
pub mod portfolio;
pub mod snapshot;
pub mod stats;
pub mod stats_formatter;
pub mod timeframe;
pub mod trade;
pub mod traits;

pub use candle::Candle;
pub use config::{
    AppConfig, IndicatorConfig, MacdSignalMode, RiskConfig, SimulationConfig, MIN_CANDLES,
};
pub use config_loader::ConfigLoader;
pub use context::{MarketContext, Momentum, Trend, Volatility};
pub use decision::{DecisionRequest, TradeAction, TradeDecision};
pub use error::DataError;
pub use portfolio::{PortfolioState, Position, PositionSide};
pub use snapshot::{
    BollingerBands, IndicatorSnapshot, KeltnerChannels, MacdIndicator, MarketDelta,
    SqueezeIntensity, SqueezeState, VolumeBucket, VolumeImbalance, VolumeProfile, VwapBands,
};
pub use stats::PerformanceStats;
pub use stats_formatter::StatsFormatter;
pub use timeframe::{parse_timeframe, timeframe_duration};
pub use trade::{EquityPoint, ExitReason, TradeExit, TradeRecord};
pub use traits::{CandleSupplier, DashboardSink, DashboardUpdate, DecisionProvider};

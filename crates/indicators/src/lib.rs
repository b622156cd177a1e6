pub mod bollinger;
pub mod classifier;
pub mod engine;
pub mod keltner;
pub mod macd;
pub mod market_delta;
pub mod math;
pub mod volume_profile;
pub mod vwap;

pub use bollinger::compute_bollinger;
pub use classifier::MarketContextClassifier;
pub use engine::IndicatorEngine;
pub use keltner::{compute_keltner, detect_squeeze};
pub use macd::compute_macd;
pub use market_delta::compute_market_delta;
pub use volume_profile::compute_volume_profile;
pub use vwap::compute_vwap;

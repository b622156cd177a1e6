pub mod backtest;
pub mod data_provider;
pub mod execution;
pub mod paper;
pub mod pipeline;
pub mod result;
pub mod sink;
pub mod tracker;

pub use backtest::BacktestRunner;
pub use data_provider::CsvCandleSupplier;
pub use execution::ExecutionSimulator;
pub use paper::PaperTrader;
pub use pipeline::SimulationPipeline;
pub use result::{BacktestResult, DecisionLogEntry};
pub use sink::JsonLinesSink;
pub use tracker::PerformanceTracker;

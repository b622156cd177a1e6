//! Persisted simulation output.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tradesim_core::{AppConfig, EquityPoint, PerformanceStats, TradeDecision, TradeRecord};
use tradesim_risk::TradeAssessment;

/// One provider decision and how the risk gate treated it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub decision: TradeDecision,
    /// Absent for HOLD decisions, which are never gated.
    pub assessment: Option<TradeAssessment>,
}

/// Complete output of a backtest run; the only externally persisted
/// artifact the engine produces. Rendering is someone else's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    pub config: AppConfig,
    pub stats: PerformanceStats,
    pub trades: Vec<TradeRecord>,
    pub decisions: Vec<DecisionLogEntry>,
    pub equity_curve: Vec<EquityPoint>,
    /// Per-candle faults that were absorbed so the run could continue.
    pub fault_count: usize,
    pub duration_ms: u64,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

impl BacktestResult {
    /// Writes the result as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or serialized.
    pub fn save_to_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path)
            .with_context(|| format!("creating result file {}", path.display()))?;
        serde_json::to_writer_pretty(file, self)
            .with_context(|| format!("serializing result to {}", path.display()))?;
        tracing::info!(path = %path.display(), "backtest result saved");
        Ok(())
    }
}

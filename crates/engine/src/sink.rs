//! Dashboard sink implementations.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tradesim_core::{DashboardSink, DashboardUpdate};

/// Appends each update as one JSON line. Useful for local runs where the
/// "dashboard" is a tail -f.
pub struct JsonLinesSink {
    path: PathBuf,
}

impl JsonLinesSink {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DashboardSink for JsonLinesSink {
    async fn push(&self, update: &DashboardUpdate) -> Result<()> {
        let mut line = serde_json::to_vec(update).context("serializing dashboard update")?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("opening dashboard file {}", self.path.display()))?;
        file.write_all(&line).await?;
        Ok(())
    }
}

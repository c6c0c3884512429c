//! CSV/JSON report adapter.
//!
//! Writes three artifacts into the output directory: `trades.csv`,
//! `equity.csv`, and `metrics.json`. The CSV layouts come straight from the
//! serde shape of [`Trade`] and [`EquityPoint`], so the files round-trip.

use crate::domain::error::ReclaimerError;
use crate::domain::run::SimulationResult;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::Path;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, result: &SimulationResult, output_dir: &Path) -> Result<(), ReclaimerError> {
        fs::create_dir_all(output_dir)?;

        let mut trades = csv::Writer::from_path(output_dir.join("trades.csv"))
            .map_err(|e| ReclaimerError::Data {
                reason: format!("failed to create trades.csv: {}", e),
            })?;
        for trade in &result.trades {
            trades.serialize(trade).map_err(|e| ReclaimerError::Data {
                reason: format!("failed to write trade {}: {}", trade.id, e),
            })?;
        }
        trades.flush()?;

        let mut equity = csv::Writer::from_path(output_dir.join("equity.csv"))
            .map_err(|e| ReclaimerError::Data {
                reason: format!("failed to create equity.csv: {}", e),
            })?;
        for point in &result.equity_curve {
            equity.serialize(point).map_err(|e| ReclaimerError::Data {
                reason: format!("failed to write equity point: {}", e),
            })?;
        }
        equity.flush()?;

        let metrics = serde_json::to_string_pretty(&result.metrics).map_err(|e| {
            ReclaimerError::Data {
                reason: format!("failed to serialize metrics: {}", e),
            }
        })?;
        fs::write(output_dir.join("metrics.json"), metrics)?;

        Ok(())
    }
}

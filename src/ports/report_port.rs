//! Report generation port trait.

use crate::domain::error::ReclaimerError;
use crate::domain::run::SimulationResult;
use std::path::Path;

/// Port for writing simulation result artifacts.
pub trait ReportPort {
    fn write(&self, result: &SimulationResult, output_dir: &Path) -> Result<(), ReclaimerError>;
}

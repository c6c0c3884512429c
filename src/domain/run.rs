//! Simulation entry point.
//!
//! `run_simulation` is stateless per call: validate the config, build the
//! per-timeframe series, derive and assess signals, run the lifecycle, and
//! report. Identical inputs always produce identical output.

use crate::domain::analyzer::{EquityPoint, PerformanceMetrics, build_equity_curve};
use crate::domain::bar::Bar;
use crate::domain::config::SimulationConfig;
use crate::domain::config_validation::validate_config;
use crate::domain::conflict::{ConflictAssessment, assess};
use crate::domain::error::ReclaimerError;
use crate::domain::series::TimeframeSeries;
use crate::domain::signal::{Signal, generate_signals};
use crate::domain::simulator::simulate;
use crate::domain::timeframe::Timeframe;
use crate::domain::trade::Trade;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Non-fatal event counters accumulated over one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub signals_generated: usize,
    pub skipped_missing_data: usize,
    pub skipped_below_threshold: usize,
    pub skipped_blocked: usize,
    pub skipped_no_target: usize,
    pub skipped_degenerate_stop: usize,
    pub forced_closes: usize,
    pub data_unavailable_conflicts: usize,
}

impl Diagnostics {
    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_data
            + self.skipped_below_threshold
            + self.skipped_blocked
            + self.skipped_no_target
            + self.skipped_degenerate_stop
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationResult {
    pub trades: Vec<Trade>,
    pub equity_curve: Vec<EquityPoint>,
    pub metrics: PerformanceMetrics,
    pub diagnostics: Diagnostics,
}

/// Run one full simulation over pre-loaded bars. The map must contain every
/// timeframe in the hierarchy plus the reference timeframe.
pub fn run_simulation(
    symbol: &str,
    bars_by_timeframe: BTreeMap<Timeframe, Vec<Bar>>,
    config: &SimulationConfig,
) -> Result<SimulationResult, ReclaimerError> {
    validate_config(config)?;

    let mut bars_by_timeframe = bars_by_timeframe;
    let mut series_map: BTreeMap<Timeframe, TimeframeSeries> = BTreeMap::new();
    for timeframe in config.required_timeframes() {
        let bars = bars_by_timeframe.remove(&timeframe).unwrap_or_default();
        let series =
            TimeframeSeries::build(symbol, timeframe, bars, &config.series_params(timeframe))?;
        series_map.insert(timeframe, series);
    }

    let mut diagnostics = Diagnostics::default();
    let mut assessed: Vec<(Signal, ConflictAssessment)> = Vec::new();
    let reference = &series_map[&config.reference_timeframe];

    for &timeframe in config.signal_timeframes() {
        let Some(series) = series_map.get(&timeframe) else {
            continue;
        };
        let (signals, stats) = generate_signals(series, &config.signal_params(timeframe));
        diagnostics.signals_generated += stats.emitted;
        diagnostics.skipped_missing_data += stats.skipped_missing_data;
        diagnostics.skipped_below_threshold += stats.skipped_below_threshold;

        for signal in signals {
            let assessment = match series.index_at(signal.timestamp) {
                Some(index) => assess(series, index, reference, signal.timestamp),
                None => ConflictAssessment::DataUnavailable,
            };
            if assessment == ConflictAssessment::DataUnavailable {
                diagnostics.data_unavailable_conflicts += 1;
            }
            assessed.push((signal, assessment));
        }
    }

    let outcome = simulate(&series_map, assessed, config);
    diagnostics.skipped_blocked = outcome.skipped_blocked;
    diagnostics.skipped_no_target = outcome.skipped_no_target;
    diagnostics.skipped_degenerate_stop = outcome.skipped_degenerate_stop;
    diagnostics.forced_closes = outcome.forced_closes;

    let equity_curve = build_equity_curve(&outcome.trades, config.initial_balance);
    let metrics = PerformanceMetrics::compute(&outcome.trades, config.initial_balance);

    Ok(SimulationResult {
        trades: outcome.trades,
        equity_curve,
        metrics,
        diagnostics,
    })
}

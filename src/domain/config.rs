//! Simulation configuration.
//!
//! One immutable struct passed into the entry point. There is no ambient
//! global config; every tunable the engine reads lives here.

use crate::domain::conflict::{ConflictAssessment, DataUnavailablePolicy, RiskPolicy};
use crate::domain::series::SeriesParams;
use crate::domain::signal::SignalParams;
use crate::domain::timeframe::Timeframe;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub initial_balance: f64,
    /// Per-trade risk as a fraction of balance, in percent.
    pub base_risk_pct: f64,
    /// Active timeframes, ascending. Signals are generated on every level
    /// except the top, which only serves as a target.
    pub hierarchy: Vec<Timeframe>,
    pub reference_timeframe: Timeframe,
    /// Extension threshold (percent) per timeframe. Every hierarchy member
    /// and the reference timeframe must have an entry.
    pub thresholds: HashMap<Timeframe, f64>,
    /// Confidence weights; timeframes without an entry weigh 1.0.
    pub timeframe_weights: HashMap<Timeframe, f64>,
    pub baseline_period: usize,
    pub confirmation_bars: usize,
    pub extension_lookback_bars: usize,
    pub stop_lookback_bars: usize,
    pub stop_buffer_pct: f64,
    pub breakeven_offset_pct: f64,
    pub risk_multipliers: HashMap<ConflictAssessment, f64>,
    pub data_unavailable_policy: DataUnavailablePolicy,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            initial_balance: 10_000.0,
            base_risk_pct: 1.0,
            hierarchy: vec![Timeframe::M15, Timeframe::H1, Timeframe::H4],
            reference_timeframe: Timeframe::H4,
            thresholds: HashMap::new(),
            timeframe_weights: HashMap::new(),
            baseline_period: 9,
            confirmation_bars: 2,
            extension_lookback_bars: 10,
            stop_lookback_bars: 5,
            stop_buffer_pct: 1.0,
            breakeven_offset_pct: 0.0,
            risk_multipliers: HashMap::new(),
            data_unavailable_policy: DataUnavailablePolicy::TreatAsNoConflict,
        }
    }
}

impl SimulationConfig {
    pub fn threshold(&self, timeframe: Timeframe) -> Option<f64> {
        self.thresholds.get(&timeframe).copied()
    }

    pub fn weight(&self, timeframe: Timeframe) -> f64 {
        self.timeframe_weights
            .get(&timeframe)
            .copied()
            .unwrap_or(1.0)
    }

    /// Every timeframe whose bars the run needs: the hierarchy plus the
    /// reference timeframe, deduplicated, ascending.
    pub fn required_timeframes(&self) -> Vec<Timeframe> {
        let mut timeframes = self.hierarchy.clone();
        if !timeframes.contains(&self.reference_timeframe) {
            timeframes.push(self.reference_timeframe);
        }
        timeframes.sort();
        timeframes.dedup();
        timeframes
    }

    /// Timeframes that emit signals: every hierarchy level below the top.
    pub fn signal_timeframes(&self) -> &[Timeframe] {
        match self.hierarchy.split_last() {
            Some((_, below_top)) => below_top,
            None => &[],
        }
    }

    pub fn series_params(&self, timeframe: Timeframe) -> SeriesParams {
        SeriesParams {
            baseline_period: self.baseline_period,
            extension_threshold_pct: self.threshold(timeframe).unwrap_or(f64::INFINITY),
            confirmation_bars: self.confirmation_bars,
            extension_lookback_bars: self.extension_lookback_bars,
        }
    }

    pub fn signal_params(&self, timeframe: Timeframe) -> SignalParams {
        SignalParams {
            stop_lookback_bars: self.stop_lookback_bars,
            stop_buffer_pct: self.stop_buffer_pct,
            threshold_pct: self.threshold(timeframe).unwrap_or(f64::INFINITY),
            weight: self.weight(timeframe),
        }
    }

    pub fn risk_policy(&self) -> RiskPolicy {
        RiskPolicy {
            base_risk_pct: self.base_risk_pct,
            multipliers: self.risk_multipliers.clone(),
            data_unavailable_policy: self.data_unavailable_policy,
        }
    }
}

//! Signal generation from reclamation events.
//!
//! Each reclamation is re-checked against the timeframe's extension threshold
//! and turned into an entry/stop pair. A bullish reclaim goes long, a bearish
//! reclaim goes short. Signals that cannot be priced (no preceding bars for
//! the stop window) are skipped and counted, never errored.

use crate::domain::reclamation::ReclaimKind;
use crate::domain::series::TimeframeSeries;
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// +1 for long, -1 for short. Multiplies price differences into pnl.
    pub fn sign(self) -> f64 {
        match self {
            Direction::Long => 1.0,
            Direction::Short => -1.0,
        }
    }
}

/// A tradeable entry derived from one reclamation. Consumed by at most one
/// trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub timestamp: NaiveDateTime,
    pub timeframe: Timeframe,
    pub direction: Direction,
    pub entry_price: f64,
    pub stop_price: f64,
    pub extension_magnitude: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalParams {
    pub stop_lookback_bars: usize,
    pub stop_buffer_pct: f64,
    /// Extension threshold for this timeframe, in percent.
    pub threshold_pct: f64,
    /// Confidence weight for this timeframe.
    pub weight: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SignalStats {
    pub emitted: usize,
    pub skipped_missing_data: usize,
    pub skipped_below_threshold: usize,
}

/// Derive signals from every reclamation event in the series, in bar order.
pub fn generate_signals(
    series: &TimeframeSeries,
    params: &SignalParams,
) -> (Vec<Signal>, SignalStats) {
    let mut signals = Vec::new();
    let mut stats = SignalStats::default();

    for index in series.reclamation_indices() {
        let reclamation = match series.reclamation_at(index) {
            Some(event) => *event,
            None => continue,
        };

        if params.threshold_pct <= 0.0
            || reclamation.extension_magnitude.abs() < params.threshold_pct
        {
            stats.skipped_below_threshold += 1;
            continue;
        }

        let Some(bar) = series.bar(index) else {
            stats.skipped_missing_data += 1;
            continue;
        };

        let window_start = index.saturating_sub(params.stop_lookback_bars);
        let window = &series.bars()[window_start..index];
        if window.is_empty() {
            stats.skipped_missing_data += 1;
            continue;
        }

        let direction = match reclamation.kind {
            ReclaimKind::Bullish => Direction::Long,
            ReclaimKind::Bearish => Direction::Short,
        };
        let stop_price = match direction {
            Direction::Long => {
                let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
                lowest * (1.0 - params.stop_buffer_pct / 100.0)
            }
            Direction::Short => {
                let highest = window
                    .iter()
                    .map(|b| b.high)
                    .fold(f64::NEG_INFINITY, f64::max);
                highest * (1.0 + params.stop_buffer_pct / 100.0)
            }
        };

        let confidence = (reclamation.extension_magnitude.abs() / params.threshold_pct
            * params.weight)
            .min(1.0);

        signals.push(Signal {
            timestamp: bar.timestamp,
            timeframe: series.timeframe,
            direction,
            entry_price: bar.close,
            stop_price,
            extension_magnitude: reclamation.extension_magnitude,
            confidence,
        });
        stats.emitted += 1;
    }

    (signals, stats)
}

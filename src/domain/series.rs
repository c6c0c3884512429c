//! Per-timeframe bar series with computed indicator columns.
//!
//! A `TimeframeSeries` is built once from sorted bars and is read-only after
//! construction. All lookups resolve to `Option` scalars: a warmup, gap, or
//! out-of-range query is `None`, never a default value.

use crate::domain::bar::Bar;
use crate::domain::baseline::{BaselinePoint, ema_baseline};
use crate::domain::error::ReclaimerError;
use crate::domain::extension::{ExtensionState, detect_extensions};
use crate::domain::reclamation::{Reclamation, ReclamationParams, detect_reclamations};
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDateTime;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct SeriesParams {
    pub baseline_period: usize,
    pub extension_threshold_pct: f64,
    pub confirmation_bars: usize,
    pub extension_lookback_bars: usize,
}

#[derive(Debug, Clone)]
pub struct TimeframeSeries {
    pub timeframe: Timeframe,
    bars: Vec<Bar>,
    baseline: Vec<BaselinePoint>,
    extensions: Vec<ExtensionState>,
    reclamations: Vec<Option<Reclamation>>,
    by_timestamp: HashMap<NaiveDateTime, usize>,
}

impl TimeframeSeries {
    /// Build the series and all computed columns. Bars must be sorted by
    /// timestamp with no duplicates; at least `baseline_period` bars are
    /// required so the baseline has a valid region.
    pub fn build(
        symbol: &str,
        timeframe: Timeframe,
        bars: Vec<Bar>,
        params: &SeriesParams,
    ) -> Result<TimeframeSeries, ReclaimerError> {
        if bars.is_empty() {
            return Err(ReclaimerError::NoData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
            });
        }
        if bars.len() < params.baseline_period {
            return Err(ReclaimerError::InsufficientData {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                bars: bars.len(),
                minimum: params.baseline_period,
            });
        }
        for pair in bars.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ReclaimerError::Data {
                    reason: format!(
                        "{} {} bars not strictly ascending at {}",
                        symbol, timeframe, pair[1].timestamp
                    ),
                });
            }
        }

        let baseline = ema_baseline(&bars, params.baseline_period);
        let extensions = detect_extensions(&bars, &baseline, params.extension_threshold_pct);
        let reclamation_params = ReclamationParams {
            confirmation_bars: params.confirmation_bars,
            extension_lookback_bars: params.extension_lookback_bars,
        };
        let reclamations = detect_reclamations(&bars, &baseline, &extensions, &reclamation_params);
        let by_timestamp = bars
            .iter()
            .enumerate()
            .map(|(i, bar)| (bar.timestamp, i))
            .collect();

        Ok(TimeframeSeries {
            timeframe,
            bars,
            baseline,
            extensions,
            reclamations,
            by_timestamp,
        })
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn bar(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    /// Baseline scalar at `index`; `None` during warmup or out of range.
    pub fn baseline_at(&self, index: usize) -> Option<f64> {
        self.baseline.get(index).and_then(BaselinePoint::scalar)
    }

    pub fn extension_at(&self, index: usize) -> Option<&ExtensionState> {
        self.extensions.get(index)
    }

    pub fn reclamation_at(&self, index: usize) -> Option<&Reclamation> {
        self.reclamations.get(index).and_then(Option::as_ref)
    }

    /// Indices of all bars carrying a reclamation event, ascending.
    pub fn reclamation_indices(&self) -> Vec<usize> {
        self.reclamations
            .iter()
            .enumerate()
            .filter_map(|(i, event)| event.as_ref().map(|_| i))
            .collect()
    }

    /// Exact bar index for a timestamp, if a bar opens at it.
    pub fn index_at(&self, timestamp: NaiveDateTime) -> Option<usize> {
        self.by_timestamp.get(&timestamp).copied()
    }

    /// Index of the bar whose `[open, open + duration)` interval contains
    /// `timestamp`. A gap in the data, where the latest bar at or before the
    /// timestamp has already nominally ended, resolves to `None`.
    pub fn containing_index(&self, timestamp: NaiveDateTime) -> Option<usize> {
        let upper = self
            .bars
            .partition_point(|bar| bar.timestamp <= timestamp);
        if upper == 0 {
            return None;
        }
        let candidate = upper - 1;
        let open = self.bars[candidate].timestamp;
        if timestamp < open + self.timeframe.duration() {
            Some(candidate)
        } else {
            None
        }
    }

    pub fn first_timestamp(&self) -> NaiveDateTime {
        self.bars[0].timestamp
    }

    pub fn last_timestamp(&self) -> NaiveDateTime {
        self.bars[self.bars.len() - 1].timestamp
    }

    pub fn last_close(&self) -> f64 {
        self.bars[self.bars.len() - 1].close
    }
}

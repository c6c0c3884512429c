//! Progressive target management.
//!
//! A trade's target walks up the configured hierarchy: the level-k target is
//! the next-higher timeframe's baseline at the bar containing the current
//! time. Touching a target moves the stop to breakeven and projects the next
//! level; past the top of the hierarchy the trade closes at the touched
//! target. Advancement is strictly monotonic.

use crate::domain::series::TimeframeSeries;
use crate::domain::signal::Direction;
use crate::domain::timeframe::Timeframe;
use crate::domain::trade::Trade;
use chrono::NaiveDateTime;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
pub struct TargetManager {
    hierarchy: Vec<Timeframe>,
    breakeven_offset_pct: f64,
}

/// Outcome of a target touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advancement {
    /// Stop moved to breakeven, next level's target projected.
    Continued,
    /// No further level; the trade closes at the touched target.
    Final,
}

impl TargetManager {
    pub fn new(hierarchy: Vec<Timeframe>, breakeven_offset_pct: f64) -> TargetManager {
        TargetManager {
            hierarchy,
            breakeven_offset_pct,
        }
    }

    /// The baseline of `timeframe` at the bar containing `at`, if available.
    fn project(
        &self,
        timeframe: Timeframe,
        series_map: &BTreeMap<Timeframe, TimeframeSeries>,
        at: NaiveDateTime,
    ) -> Option<f64> {
        let series = series_map.get(&timeframe)?;
        let index = series.containing_index(at)?;
        series.baseline_at(index)
    }

    fn level_of(&self, timeframe: Timeframe) -> Option<usize> {
        self.hierarchy.iter().position(|&tf| tf == timeframe)
    }

    /// Target timeframe and price for a fresh entry on `entry_timeframe`.
    /// `None` when the entry sits at the top of the hierarchy or the next
    /// level's baseline cannot be projected at `at`.
    pub fn initial_target(
        &self,
        entry_timeframe: Timeframe,
        series_map: &BTreeMap<Timeframe, TimeframeSeries>,
        at: NaiveDateTime,
    ) -> Option<(Timeframe, f64)> {
        let level = self.level_of(entry_timeframe)?;
        let target_tf = *self.hierarchy.get(level + 1)?;
        let price = self.project(target_tf, series_map, at)?;
        Some((target_tf, price))
    }

    /// Handle a target touch at `at`. On `Continued` the trade's stop,
    /// target timeframe, and target price are updated in place; on `Final`
    /// the caller closes the trade at the touched target price.
    pub fn advance(
        &self,
        trade: &mut Trade,
        series_map: &BTreeMap<Timeframe, TimeframeSeries>,
        at: NaiveDateTime,
    ) -> Advancement {
        let Some(level) = self.level_of(trade.current_target_timeframe) else {
            return Advancement::Final;
        };
        let Some(&next_tf) = self.hierarchy.get(level + 1) else {
            return Advancement::Final;
        };
        let Some(next_target) = self.project(next_tf, series_map, at) else {
            return Advancement::Final;
        };

        trade.stop_price = self.breakeven_stop(trade);
        trade.current_target_timeframe = next_tf;
        trade.target_price = next_target;
        Advancement::Continued
    }

    /// Entry price nudged by the configured offset, locking a sliver of
    /// profit when the offset is positive.
    fn breakeven_stop(&self, trade: &Trade) -> f64 {
        let offset = self.breakeven_offset_pct / 100.0;
        match trade.direction {
            Direction::Long => trade.entry_price * (1.0 + offset),
            Direction::Short => trade.entry_price * (1.0 - offset),
        }
    }
}

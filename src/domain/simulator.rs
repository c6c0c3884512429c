//! Bar-by-bar trade lifecycle simulation.
//!
//! Signals from all timeframes are merged into one queue ordered by
//! (timestamp, hierarchy index, emission order). The simulation clock is the
//! merged set of bar timestamps across the hierarchy; at each tick open
//! trades are managed first (oldest id first, on bars of their entry
//! timeframe), then new signals are admitted. Balance is shared state: each
//! entry sizes off the balance current at that moment, and closes update it
//! strictly in exit order.

use crate::domain::config::SimulationConfig;
use crate::domain::conflict::ConflictAssessment;
use crate::domain::series::TimeframeSeries;
use crate::domain::signal::Signal;
use crate::domain::target::{Advancement, TargetManager};
use crate::domain::timeframe::Timeframe;
use crate::domain::trade::{Trade, TradeStatus};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, BTreeSet};

/// Closed trades plus the admission counters the run report surfaces.
#[derive(Debug, Clone, Default)]
pub struct SimulatorOutcome {
    /// All trades, closed, sorted by (exit_time, id).
    pub trades: Vec<Trade>,
    pub final_balance: f64,
    pub skipped_blocked: usize,
    pub skipped_no_target: usize,
    pub skipped_degenerate_stop: usize,
    pub forced_closes: usize,
}

/// Run the full lifecycle over pre-assessed signals. `signals` carries each
/// signal with its conflict assessment; emission order within a timeframe is
/// preserved by the stable sort.
pub fn simulate(
    series_map: &BTreeMap<Timeframe, TimeframeSeries>,
    mut signals: Vec<(Signal, ConflictAssessment)>,
    config: &SimulationConfig,
) -> SimulatorOutcome {
    signals.sort_by_key(|(signal, _)| (signal.timestamp, signal.timeframe.index()));

    let risk_policy = config.risk_policy();
    let targets = TargetManager::new(config.hierarchy.clone(), config.breakeven_offset_pct);

    let clock: BTreeSet<NaiveDateTime> = config
        .hierarchy
        .iter()
        .filter_map(|tf| series_map.get(tf))
        .flat_map(|series| series.bars().iter().map(|bar| bar.timestamp))
        .collect();

    let mut outcome = SimulatorOutcome::default();
    let mut balance = config.initial_balance;
    let mut open: Vec<Trade> = Vec::new();
    let mut next_id: u64 = 1;
    let mut pending = signals.into_iter().peekable();

    for &now in &clock {
        // Manage open trades first, oldest id first. A trade is only
        // examined on bars of its own entry timeframe, starting strictly
        // after its entry time.
        for trade in open.iter_mut() {
            let Some(series) = series_map.get(&trade.entry_timeframe) else {
                continue;
            };
            let Some(index) = series.index_at(now) else {
                continue;
            };
            let bar = &series.bars()[index];
            if bar.timestamp <= trade.entry_time {
                continue;
            }

            if trade.stop_touched(bar) {
                // Stop assumed hit first when the target is in range too.
                trade.close(TradeStatus::StoppedOut, now, trade.stop_price);
            } else if trade.target_touched(bar) {
                let touched = trade.target_price;
                match targets.advance(trade, series_map, now) {
                    Advancement::Continued => {}
                    Advancement::Final => {
                        trade.close(TradeStatus::FinalTargetHit, now, touched);
                    }
                }
            }
        }
        for trade in &open {
            if !trade.is_open() {
                if let Some(pnl) = trade.realized_pnl {
                    balance += pnl;
                }
                outcome.trades.push(trade.clone());
            }
        }
        open.retain(Trade::is_open);

        // Admit signals stamped at this tick.
        while pending
            .peek()
            .is_some_and(|(signal, _)| signal.timestamp == now)
        {
            let (signal, assessment) = match pending.next() {
                Some(entry) => entry,
                None => break,
            };

            let adjusted_risk_pct = risk_policy.adjusted_risk_pct(assessment);
            if adjusted_risk_pct <= 0.0 {
                outcome.skipped_blocked += 1;
                continue;
            }
            let Some((target_tf, target_price)) =
                targets.initial_target(signal.timeframe, series_map, now)
            else {
                outcome.skipped_no_target += 1;
                continue;
            };
            let risk_per_unit = (signal.entry_price - signal.stop_price).abs();
            if risk_per_unit <= f64::EPSILON {
                outcome.skipped_degenerate_stop += 1;
                continue;
            }

            let position_size = balance * adjusted_risk_pct / 100.0 / risk_per_unit;
            open.push(Trade {
                id: next_id,
                entry_timeframe: signal.timeframe,
                direction: signal.direction,
                entry_time: signal.timestamp,
                entry_price: signal.entry_price,
                stop_price: signal.stop_price,
                current_target_timeframe: target_tf,
                target_price,
                status: TradeStatus::Open,
                exit_time: None,
                exit_price: None,
                position_size,
                realized_pnl: None,
                conflict_at_entry: assessment,
            });
            next_id += 1;
        }
    }

    // Data ran out under the remaining trades: close each at the final bar
    // of its entry timeframe, chronologically.
    let mut remaining = std::mem::take(&mut open);
    remaining.sort_by_key(|trade| {
        let exit = series_map
            .get(&trade.entry_timeframe)
            .map(|series| series.last_timestamp())
            .unwrap_or(trade.entry_time);
        (exit, trade.id)
    });
    for mut trade in remaining {
        let (exit_time, exit_price) = match series_map.get(&trade.entry_timeframe) {
            Some(series) => (series.last_timestamp(), series.last_close()),
            None => (trade.entry_time, trade.entry_price),
        };
        trade.close(TradeStatus::ClosedEndOfData, exit_time, exit_price);
        if let Some(pnl) = trade.realized_pnl {
            balance += pnl;
        }
        outcome.forced_closes += 1;
        outcome.trades.push(trade);
    }

    outcome
        .trades
        .sort_by_key(|trade| (trade.exit_time, trade.id));
    outcome.final_balance = balance;
    outcome
}

//! Performance statistics over the closed-trade list.
//!
//! Everything here is a pure function of the trades and the starting
//! balance. Trades are replayed in exit order to rebuild the equity curve;
//! the metrics snapshot is derived from the same pass.

use crate::domain::timeframe::Timeframe;
use crate::domain::trade::Trade;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    pub timestamp: NaiveDateTime,
    pub balance: f64,
    /// Distance below the running peak, as a fraction of the peak.
    pub drawdown_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeBreakdown {
    pub timeframe: Timeframe,
    pub trades: usize,
    pub wins: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceMetrics {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub gross_profit: f64,
    pub gross_loss: f64,
    /// Gross profit over gross loss; +inf when there are wins and no
    /// losses, 0 when there is nothing to divide.
    pub profit_factor: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
    /// Mean win over mean loss, realized.
    pub reward_risk_ratio: f64,
    /// Mean over stddev of per-trade returns (pnl relative to the balance
    /// before each trade).
    pub sharpe_ratio: f64,
    pub total_return_pct: f64,
    pub max_drawdown_pct: f64,
    pub final_balance: f64,
    pub by_timeframe: Vec<TimeframeBreakdown>,
}

/// Replay closed trades in exit order into an equity curve. One point per
/// close; trades without an exit are ignored.
pub fn build_equity_curve(trades: &[Trade], initial_balance: f64) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(trades.len());
    let mut balance = initial_balance;
    let mut peak = initial_balance;

    for trade in trades {
        let (Some(exit_time), Some(pnl)) = (trade.exit_time, trade.realized_pnl) else {
            continue;
        };
        balance += pnl;
        peak = peak.max(balance);
        let drawdown_pct = if peak > 0.0 { (peak - balance) / peak } else { 0.0 };
        curve.push(EquityPoint {
            timestamp: exit_time,
            balance,
            drawdown_pct,
        });
    }

    curve
}

impl PerformanceMetrics {
    /// Compute the full snapshot. `trades` must already be in exit order,
    /// as produced by the simulator.
    pub fn compute(trades: &[Trade], initial_balance: f64) -> PerformanceMetrics {
        let closed: Vec<&Trade> = trades
            .iter()
            .filter(|trade| trade.realized_pnl.is_some())
            .collect();

        let mut gross_profit = 0.0;
        let mut gross_loss = 0.0;
        let mut winning_trades = 0;
        let mut losing_trades = 0;
        let mut largest_win = 0.0_f64;
        let mut largest_loss = 0.0_f64;
        let mut win_streak = 0;
        let mut loss_streak = 0;
        let mut longest_win_streak = 0;
        let mut longest_loss_streak = 0;
        let mut returns = Vec::with_capacity(closed.len());
        let mut balance = initial_balance;
        let mut by_timeframe: BTreeMap<Timeframe, TimeframeBreakdown> = BTreeMap::new();

        for trade in &closed {
            let pnl = trade.realized_pnl.unwrap_or(0.0);
            if balance > 0.0 {
                returns.push(pnl / balance);
            }
            balance += pnl;

            if pnl > 0.0 {
                winning_trades += 1;
                gross_profit += pnl;
                largest_win = largest_win.max(pnl);
                win_streak += 1;
                loss_streak = 0;
            } else {
                losing_trades += 1;
                gross_loss += -pnl;
                largest_loss = largest_loss.max(-pnl);
                loss_streak += 1;
                win_streak = 0;
            }
            longest_win_streak = longest_win_streak.max(win_streak);
            longest_loss_streak = longest_loss_streak.max(loss_streak);

            let entry = by_timeframe
                .entry(trade.entry_timeframe)
                .or_insert_with(|| TimeframeBreakdown {
                    timeframe: trade.entry_timeframe,
                    trades: 0,
                    wins: 0,
                    win_rate: 0.0,
                    total_pnl: 0.0,
                });
            entry.trades += 1;
            if pnl > 0.0 {
                entry.wins += 1;
            }
            entry.total_pnl += pnl;
        }

        let total_trades = closed.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64
        } else {
            0.0
        };
        let profit_factor = if gross_loss > 0.0 {
            gross_profit / gross_loss
        } else if gross_profit > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        let average_win = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };
        let average_loss = if losing_trades > 0 {
            gross_loss / losing_trades as f64
        } else {
            0.0
        };
        let reward_risk_ratio = if average_loss > 0.0 {
            average_win / average_loss
        } else if average_win > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };
        let sharpe_ratio = sharpe(&returns);
        let total_return_pct = if initial_balance > 0.0 {
            (balance - initial_balance) / initial_balance * 100.0
        } else {
            0.0
        };
        let curve = build_equity_curve(trades, initial_balance);
        let max_drawdown_pct = curve
            .iter()
            .map(|point| point.drawdown_pct)
            .fold(0.0, f64::max);

        let by_timeframe = by_timeframe
            .into_values()
            .map(|mut breakdown| {
                breakdown.win_rate = breakdown.wins as f64 / breakdown.trades as f64;
                breakdown
            })
            .collect();

        PerformanceMetrics {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            gross_profit,
            gross_loss,
            profit_factor,
            average_win,
            average_loss,
            largest_win,
            largest_loss,
            longest_win_streak,
            longest_loss_streak,
            reward_risk_ratio,
            sharpe_ratio,
            total_return_pct,
            max_drawdown_pct,
            final_balance: balance,
            by_timeframe,
        }
    }
}

fn sharpe(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    let stddev = variance.sqrt();
    if stddev > 0.0 { mean / stddev } else { 0.0 }
}

//! Trade records and lifecycle.

use crate::domain::bar::Bar;
use crate::domain::conflict::ConflictAssessment;
use crate::domain::signal::Direction;
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Open,
    StoppedOut,
    FinalTargetHit,
    /// Force-closed at the last available bar of the entry timeframe.
    ClosedEndOfData,
}

/// One trade, opened from exactly one signal. Flat record so the full
/// lifecycle serializes as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: u64,
    pub entry_timeframe: Timeframe,
    pub direction: Direction,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop_price: f64,
    /// Timeframe whose projected level is the current target. Its hierarchy
    /// index never decreases.
    pub current_target_timeframe: Timeframe,
    pub target_price: f64,
    pub status: TradeStatus,
    pub exit_time: Option<NaiveDateTime>,
    pub exit_price: Option<f64>,
    pub position_size: f64,
    pub realized_pnl: Option<f64>,
    pub conflict_at_entry: ConflictAssessment,
}

impl Trade {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// Whether this bar traded through the stop. Uses one-sided range checks
    /// so a gap past the stop still counts as touched.
    pub fn stop_touched(&self, bar: &Bar) -> bool {
        match self.direction {
            Direction::Long => bar.traded_at_or_below(self.stop_price),
            Direction::Short => bar.traded_at_or_above(self.stop_price),
        }
    }

    /// Whether this bar traded through the current target.
    pub fn target_touched(&self, bar: &Bar) -> bool {
        match self.direction {
            Direction::Long => bar.traded_at_or_above(self.target_price),
            Direction::Short => bar.traded_at_or_below(self.target_price),
        }
    }

    /// Close the trade and realize pnl at `exit_price`.
    pub fn close(&mut self, status: TradeStatus, exit_time: NaiveDateTime, exit_price: f64) {
        self.status = status;
        self.exit_time = Some(exit_time);
        self.exit_price = Some(exit_price);
        self.realized_pnl =
            Some((exit_price - self.entry_price) * self.direction.sign() * self.position_size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn bar(low: f64, high: f64) -> Bar {
        Bar {
            timestamp: at(10),
            open: (low + high) / 2.0,
            high,
            low,
            close: (low + high) / 2.0,
            volume: 1000,
        }
    }

    fn long_trade() -> Trade {
        Trade {
            id: 1,
            entry_timeframe: Timeframe::M15,
            direction: Direction::Long,
            entry_time: at(9),
            entry_price: 100.0,
            stop_price: 98.0,
            current_target_timeframe: Timeframe::H1,
            target_price: 103.0,
            status: TradeStatus::Open,
            exit_time: None,
            exit_price: None,
            position_size: 50.0,
            realized_pnl: None,
            conflict_at_entry: ConflictAssessment::NoConflict,
        }
    }

    #[test]
    fn long_stop_touch_includes_gap_through() {
        let trade = long_trade();
        assert!(trade.stop_touched(&bar(97.5, 99.0)));
        // Gap straight past the stop still counts.
        assert!(trade.stop_touched(&bar(95.0, 96.0)));
        assert!(!trade.stop_touched(&bar(98.5, 100.0)));
    }

    #[test]
    fn long_target_touch() {
        let trade = long_trade();
        assert!(trade.target_touched(&bar(102.0, 103.5)));
        assert!(trade.target_touched(&bar(104.0, 105.0)));
        assert!(!trade.target_touched(&bar(101.0, 102.9)));
    }

    #[test]
    fn short_touch_rules_mirror() {
        let mut trade = long_trade();
        trade.direction = Direction::Short;
        trade.stop_price = 102.0;
        trade.target_price = 97.0;

        assert!(trade.stop_touched(&bar(101.0, 102.5)));
        assert!(!trade.stop_touched(&bar(99.0, 101.5)));
        assert!(trade.target_touched(&bar(96.5, 99.0)));
        assert!(!trade.target_touched(&bar(97.5, 99.0)));
    }

    #[test]
    fn close_realizes_signed_pnl() {
        let mut long = long_trade();
        long.close(TradeStatus::StoppedOut, at(11), 98.0);
        assert_eq!(long.status, TradeStatus::StoppedOut);
        assert_eq!(long.exit_price, Some(98.0));
        assert!((long.realized_pnl.unwrap() - (-100.0)).abs() < f64::EPSILON);

        let mut short = long_trade();
        short.direction = Direction::Short;
        short.close(TradeStatus::FinalTargetHit, at(12), 98.0);
        assert!((short.realized_pnl.unwrap() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn serde_round_trip_is_identical() {
        let mut trade = long_trade();
        trade.close(TradeStatus::FinalTargetHit, at(14), 103.0);

        let json = serde_json::to_string(&trade).unwrap();
        let back: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(back, trade);
    }
}

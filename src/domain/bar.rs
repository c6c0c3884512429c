//! Price bar representation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One OHLCV bar. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl Bar {
    /// True if the bar traded at or below `price`.
    pub fn traded_at_or_below(&self, price: f64) -> bool {
        self.low <= price
    }

    /// True if the bar traded at or above `price`.
    pub fn traded_at_or_above(&self, price: f64) -> bool {
        self.high >= price
    }

    /// True if `price` lies within the bar's [low, high] range.
    pub fn range_contains(&self, price: f64) -> bool {
        self.low <= price && price <= self.high
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_bar() -> Bar {
        Bar {
            timestamp: NaiveDate::from_ymd_opt(2024, 1, 15)
                .unwrap()
                .and_hms_opt(9, 30, 0)
                .unwrap(),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: 50_000,
        }
    }

    #[test]
    fn range_contains_bounds() {
        let bar = sample_bar();
        assert!(bar.range_contains(90.0));
        assert!(bar.range_contains(110.0));
        assert!(bar.range_contains(100.0));
        assert!(!bar.range_contains(89.9));
        assert!(!bar.range_contains(110.1));
    }

    #[test]
    fn traded_at_or_below() {
        let bar = sample_bar();
        assert!(bar.traded_at_or_below(90.0));
        assert!(bar.traded_at_or_below(95.0));
        assert!(!bar.traded_at_or_below(89.0));
    }

    #[test]
    fn traded_at_or_above() {
        let bar = sample_bar();
        assert!(bar.traded_at_or_above(110.0));
        assert!(bar.traded_at_or_above(105.0));
        assert!(!bar.traded_at_or_above(111.0));
    }

    #[test]
    fn serde_round_trip() {
        let bar = sample_bar();
        let json = serde_json::to_string(&bar).unwrap();
        let back: Bar = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bar);
    }
}

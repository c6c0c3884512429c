//! Canonical timeframe units and the fixed hierarchy.
//!
//! Every timeframe the engine knows about is one of these eleven units, in
//! ascending order. Arbitrary spellings from data files or configs are mapped
//! onto the canonical unit by [`Timeframe::parse`] at the ingestion boundary;
//! nothing inside the engine ever handles a timeframe string.

use crate::domain::error::ReclaimerError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    M1,
    M5,
    M10,
    M15,
    M30,
    H1,
    H2,
    H4,
    D1,
    W1,
    Mn1,
}

/// The full canonical hierarchy, ascending.
pub const HIERARCHY: [Timeframe; 11] = [
    Timeframe::M1,
    Timeframe::M5,
    Timeframe::M10,
    Timeframe::M15,
    Timeframe::M30,
    Timeframe::H1,
    Timeframe::H2,
    Timeframe::H4,
    Timeframe::D1,
    Timeframe::W1,
    Timeframe::Mn1,
];

impl Timeframe {
    /// Position in the canonical hierarchy (0 = 1m, 10 = 1M).
    pub fn index(self) -> usize {
        match self {
            Timeframe::M1 => 0,
            Timeframe::M5 => 1,
            Timeframe::M10 => 2,
            Timeframe::M15 => 3,
            Timeframe::M30 => 4,
            Timeframe::H1 => 5,
            Timeframe::H2 => 6,
            Timeframe::H4 => 7,
            Timeframe::D1 => 8,
            Timeframe::W1 => 9,
            Timeframe::Mn1 => 10,
        }
    }

    /// The next-higher canonical unit, if any.
    pub fn next_up(self) -> Option<Timeframe> {
        HIERARCHY.get(self.index() + 1).copied()
    }

    /// Nominal span of one bar, used for time-containment checks.
    ///
    /// Calendar months vary in length; 31 days is the containment bound.
    pub fn duration(self) -> Duration {
        match self {
            Timeframe::M1 => Duration::minutes(1),
            Timeframe::M5 => Duration::minutes(5),
            Timeframe::M10 => Duration::minutes(10),
            Timeframe::M15 => Duration::minutes(15),
            Timeframe::M30 => Duration::minutes(30),
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H2 => Duration::hours(2),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
            Timeframe::W1 => Duration::weeks(1),
            Timeframe::Mn1 => Duration::days(31),
        }
    }

    /// Normalize an arbitrary timeframe spelling to the canonical unit.
    ///
    /// Case-insensitive except for the minute/month ambiguity: a bare `"1m"`
    /// is one minute, `"1M"` is one month.
    pub fn parse(input: &str) -> Result<Timeframe, ReclaimerError> {
        let trimmed = input.trim();
        if trimmed == "1M" || trimmed == "M" {
            return Ok(Timeframe::Mn1);
        }
        let tf = match trimmed.to_lowercase().as_str() {
            "1m" | "1min" | "m1" => Some(Timeframe::M1),
            "5m" | "5min" | "m5" => Some(Timeframe::M5),
            "10m" | "10min" | "m10" => Some(Timeframe::M10),
            "15m" | "15min" | "m15" => Some(Timeframe::M15),
            "30m" | "30min" | "m30" => Some(Timeframe::M30),
            "1h" | "1hr" | "60m" | "60min" | "h1" => Some(Timeframe::H1),
            "2h" | "2hr" | "120m" | "h2" => Some(Timeframe::H2),
            "4h" | "4hr" | "240m" | "h4" => Some(Timeframe::H4),
            "1d" | "d" | "d1" | "daily" | "day" => Some(Timeframe::D1),
            "1w" | "w" | "w1" | "weekly" | "week" => Some(Timeframe::W1),
            "1mo" | "mn" | "mn1" | "monthly" | "month" => Some(Timeframe::Mn1),
            _ => None,
        };
        tf.ok_or_else(|| ReclaimerError::UnknownTimeframe {
            input: input.to_string(),
        })
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Timeframe::M1 => "1m",
            Timeframe::M5 => "5m",
            Timeframe::M10 => "10m",
            Timeframe::M15 => "15m",
            Timeframe::M30 => "30m",
            Timeframe::H1 => "1h",
            Timeframe::H2 => "2h",
            Timeframe::H4 => "4h",
            Timeframe::D1 => "1d",
            Timeframe::W1 => "1w",
            Timeframe::Mn1 => "1M",
        };
        write!(f, "{}", s)
    }
}

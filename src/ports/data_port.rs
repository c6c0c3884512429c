//! Data access port trait.

use crate::domain::bar::Bar;
use crate::domain::error::ReclaimerError;
use crate::domain::timeframe::Timeframe;
use chrono::NaiveDateTime;

pub trait DataPort {
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, ReclaimerError>;

    /// Timeframes with data on disk for this symbol, ascending.
    fn list_timeframes(&self, symbol: &str) -> Result<Vec<Timeframe>, ReclaimerError>;

    /// First timestamp, last timestamp, and bar count, if any data exists.
    fn data_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ReclaimerError>;
}

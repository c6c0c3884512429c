#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use reclaimer::domain::bar::Bar;
use reclaimer::domain::config::SimulationConfig;
use reclaimer::domain::error::ReclaimerError;
use reclaimer::domain::timeframe::Timeframe;
use reclaimer::ports::data_port::DataPort;
use std::collections::{BTreeMap, HashMap};

pub struct MockDataPort {
    pub data: HashMap<(String, Timeframe), Vec<Bar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, timeframe: Timeframe, bars: Vec<Bar>) -> Self {
        self.data.insert((symbol.to_string(), timeframe), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, ReclaimerError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(ReclaimerError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&(symbol.to_string(), timeframe))
            .cloned()
            .unwrap_or_default())
    }

    fn list_timeframes(&self, symbol: &str) -> Result<Vec<Timeframe>, ReclaimerError> {
        let mut timeframes: Vec<Timeframe> = self
            .data
            .keys()
            .filter(|(s, _)| s == symbol)
            .map(|&(_, tf)| tf)
            .collect();
        timeframes.sort();
        Ok(timeframes)
    }

    fn data_range(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Option<(NaiveDateTime, NaiveDateTime, usize)>, ReclaimerError> {
        let bars = self.fetch_bars(symbol, timeframe)?;
        Ok(bars
            .first()
            .zip(bars.last())
            .map(|(first, last)| (first.timestamp, last.timestamp, bars.len())))
    }
}

pub fn series_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Bars spaced by the timeframe's nominal duration, with a half-point range
/// around each close.
pub fn bars_from_closes(timeframe: Timeframe, closes: &[f64]) -> Vec<Bar> {
    let step = timeframe.duration();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            timestamp: series_start() + step * i as i32,
            open: close,
            high: close + 0.5,
            low: close - 0.5,
            close,
            volume: 1000,
        })
        .collect()
}

/// A 15m/1h/4h hierarchy config with thresholds set for all three levels.
pub fn test_config() -> SimulationConfig {
    let mut config = SimulationConfig {
        hierarchy: vec![Timeframe::M15, Timeframe::H1, Timeframe::H4],
        reference_timeframe: Timeframe::H4,
        ..SimulationConfig::default()
    };
    config.thresholds.insert(Timeframe::M15, 0.6);
    config.thresholds.insert(Timeframe::H1, 0.8);
    config.thresholds.insert(Timeframe::H4, 1.0);
    config
}

/// Quiet flat-market data for all three levels, long enough that every
/// baseline is live well before the end.
pub fn quiet_data() -> BTreeMap<Timeframe, Vec<Bar>> {
    let mut data = BTreeMap::new();
    data.insert(
        Timeframe::M15,
        bars_from_closes(Timeframe::M15, &[100.0; 200]),
    );
    data.insert(Timeframe::H1, bars_from_closes(Timeframe::H1, &[100.0; 50]));
    data.insert(Timeframe::H4, bars_from_closes(Timeframe::H4, &[100.0; 15]));
    data
}

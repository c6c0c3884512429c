//! CSV file data adapter.
//!
//! Bars live in one file per symbol and timeframe, named
//! `{SYMBOL}_{TF}.csv` with a `timestamp,open,high,low,close,volume`
//! header. Timestamps are `%Y-%m-%d %H:%M:%S`, with a bare-date fallback
//! for daily-and-up files. Timeframe spellings in filenames are normalized
//! here, at the ingestion boundary.

use crate::domain::bar::Bar;
use crate::domain::error::ReclaimerError;
use crate::domain::timeframe::Timeframe;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvBarAdapter {
    base_path: PathBuf,
}

impl CsvBarAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol, timeframe))
    }

    fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ReclaimerError> {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
            return Ok(timestamp);
        }
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| date.and_hms_opt(0, 0, 0).unwrap_or_default())
            .map_err(|e| ReclaimerError::Data {
                reason: format!("invalid timestamp {:?}: {}", value, e),
            })
    }

    fn field<'a>(
        record: &'a csv::StringRecord,
        index: usize,
        name: &str,
    ) -> Result<&'a str, ReclaimerError> {
        record.get(index).ok_or_else(|| ReclaimerError::Data {
            reason: format!("missing {} column", name),
        })
    }

    fn numeric<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, ReclaimerError>
    where
        T::Err: std::fmt::Display,
    {
        value.parse().map_err(|e| ReclaimerError::Data {
            reason: format!("invalid {} value {:?}: {}", name, value, e),
        })
    }
}

impl DataPort for CsvBarAdapter {
    fn fetch_bars(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Bar>, ReclaimerError> {
        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path).map_err(|e| ReclaimerError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ReclaimerError::Data {
                reason: format!("CSV parse error in {}: {}", path.display(), e),
            })?;

            let timestamp = Self::parse_timestamp(Self::field(&record, 0, "timestamp")?)?;
            let open = Self::numeric(Self::field(&record, 1, "open")?, "open")?;
            let high = Self::numeric(Self::field(&record, 2, "high")?, "high")?;
            let low = Self::numeric(Self::field(&record, 3, "low")?, "low")?;
            let close = Self::numeric(Self::field(&record, 4, "close")?, "close")?;
            let volume = Self::numeric(Self::field(&record, 5, "volume")?, "volume")?;

            bars.push(Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn list_timeframes(&self, symbol: &str) -> Result<Vec<Timeframe>, ReclaimerError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| ReclaimerError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let prefix = format!("{}_", symbol);
        let mut timeframes = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| ReclaimerError::Data {
                reason: format!("directory entry error: {}", e),
            })?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            let Some(stem) = name_str.strip_suffix(".csv") else {
                continue;
            };
            let Some(spelling) = stem.strip_prefix(&prefix) else {
                continue;
            };
            // Unrecognized spellings are someone else's files, not errors.
            if let Ok(timeframe) = Timeframe::parse(spelling) {
                timeframes.push(timeframe);
            }
        }

        timeframes.sort();
        timeframes.dedup();
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

//! Extension detection.
//!
//! A bar is extended when its close deviates from the baseline by at least
//! the timeframe's configured threshold percentage. Pure function of the bar
//! and baseline series; warmup or non-finite baselines resolve to "not
//! extended" rather than an error.

use crate::domain::bar::Bar;
use crate::domain::baseline::BaselinePoint;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtensionDirection {
    Up,
    Down,
}

/// Per-bar extension state, parallel to the bar series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtensionState {
    pub extended: bool,
    pub direction: Option<ExtensionDirection>,
    /// Signed deviation from the baseline in percent; 0 when the baseline
    /// is unavailable.
    pub magnitude_pct: f64,
}

impl ExtensionState {
    fn flat() -> Self {
        ExtensionState {
            extended: false,
            direction: None,
            magnitude_pct: 0.0,
        }
    }

    pub fn is_extended_up(&self) -> bool {
        self.extended && self.direction == Some(ExtensionDirection::Up)
    }

    pub fn is_extended_down(&self) -> bool {
        self.extended && self.direction == Some(ExtensionDirection::Down)
    }
}

/// Flag every bar whose close deviates from the baseline by at least
/// `threshold_pct` percent.
pub fn detect_extensions(
    bars: &[Bar],
    baseline: &[BaselinePoint],
    threshold_pct: f64,
) -> Vec<ExtensionState> {
    bars.iter()
        .zip(baseline.iter())
        .map(|(bar, point)| match point.scalar() {
            Some(base) if base != 0.0 => {
                let magnitude_pct = (bar.close - base) / base * 100.0;
                if !magnitude_pct.is_finite() {
                    return ExtensionState::flat();
                }
                let direction = if bar.close > base {
                    Some(ExtensionDirection::Up)
                } else if bar.close < base {
                    Some(ExtensionDirection::Down)
                } else {
                    None
                };
                ExtensionState {
                    extended: magnitude_pct.abs() >= threshold_pct,
                    direction,
                    magnitude_pct,
                }
            }
            _ => ExtensionState::flat(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::baseline::ema_baseline;
    use chrono::NaiveDate;

    fn make_bars(closes: &[f64]) -> Vec<Bar> {
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                timestamp: NaiveDate::from_ymd_opt(2024, 1, 1)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap()
                    + chrono::Duration::minutes(15 * i as i64),
                open: close,
                high: close + 0.5,
                low: close - 0.5,
                close,
                volume: 1000,
            })
            .collect()
    }

    fn flat_baseline(bars: &[Bar], value: f64) -> Vec<BaselinePoint> {
        bars.iter()
            .map(|bar| BaselinePoint {
                timestamp: bar.timestamp,
                valid: true,
                value,
            })
            .collect()
    }

    #[test]
    fn flags_up_extension_beyond_threshold() {
        let bars = make_bars(&[100.0, 100.5, 101.0]);
        let baseline = flat_baseline(&bars, 100.0);
        let states = detect_extensions(&bars, &baseline, 0.6);

        assert!(!states[0].extended);
        assert!(!states[1].extended);
        assert!(states[2].is_extended_up());
        assert!((states[2].magnitude_pct - 1.0).abs() < 1e-12);
    }

    #[test]
    fn flags_down_extension() {
        let bars = make_bars(&[100.0, 99.0]);
        let baseline = flat_baseline(&bars, 100.0);
        let states = detect_extensions(&bars, &baseline, 0.6);

        assert!(states[1].is_extended_down());
        assert!((states[1].magnitude_pct - (-1.0)).abs() < 1e-12);
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let bars = make_bars(&[100.6]);
        let baseline = flat_baseline(&bars, 100.0);
        let states = detect_extensions(&bars, &baseline, 0.6);
        assert!(states[0].extended);
    }

    #[test]
    fn magnitude_sign_matches_close_vs_baseline() {
        let bars = make_bars(&[99.0, 100.0, 101.0]);
        let baseline = flat_baseline(&bars, 100.0);
        for (bar, state) in bars.iter().zip(detect_extensions(&bars, &baseline, 0.6)) {
            let diff = bar.close - 100.0;
            assert_eq!(state.magnitude_pct > 0.0, diff > 0.0);
            assert_eq!(state.magnitude_pct < 0.0, diff < 0.0);
        }
    }

    #[test]
    fn warmup_baseline_is_not_extended() {
        let bars = make_bars(&[100.0, 100.0, 100.0, 110.0]);
        let baseline = ema_baseline(&bars, 3);
        let states = detect_extensions(&bars, &baseline, 0.6);

        // Bars 0-1 are warmup: never extended regardless of price.
        assert!(!states[0].extended);
        assert!(!states[1].extended);
        assert!(states[3].is_extended_up());
    }

    #[test]
    fn nan_baseline_is_not_extended() {
        let bars = make_bars(&[100.0]);
        let baseline = vec![BaselinePoint {
            timestamp: bars[0].timestamp,
            valid: true,
            value: f64::NAN,
        }];
        let states = detect_extensions(&bars, &baseline, 0.6);
        assert!(!states[0].extended);
        assert_eq!(states[0].magnitude_pct, 0.0);
    }
}

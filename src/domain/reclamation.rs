//! Reclamation detection.
//!
//! After an extended bar, the reclamation fires at the first bar whose close
//! crosses to the opposite side of the baseline and whose closes stay on that
//! side for the confirmation window (which counts the crossing bar itself).
//! A cross with no qualifying extension within the lookback window is not
//! emitted, which keeps flat markets quiet.

use crate::domain::bar::Bar;
use crate::domain::baseline::BaselinePoint;
use crate::domain::extension::{ExtensionDirection, ExtensionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReclaimKind {
    /// Up-extension followed by a confirmed close back below the baseline.
    Bullish,
    /// Down-extension followed by a confirmed close back above the baseline.
    Bearish,
}

/// A reclamation event, keyed at the crossing bar's index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reclamation {
    pub kind: ReclaimKind,
    /// Index of the qualifying extension bar.
    pub extension_index: usize,
    /// Signed extension magnitude at that bar, in percent.
    pub extension_magnitude: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ReclamationParams {
    /// Bars the close must hold on the reclaim side, counting the crossing
    /// bar. Minimum 1.
    pub confirmation_bars: usize,
    /// How far back from the crossing bar a qualifying extension may sit.
    pub extension_lookback_bars: usize,
}

impl Default for ReclamationParams {
    fn default() -> Self {
        ReclamationParams {
            confirmation_bars: 2,
            extension_lookback_bars: 10,
        }
    }
}

/// Scan the series and mark reclamation events, parallel to the bar series.
pub fn detect_reclamations(
    bars: &[Bar],
    baseline: &[BaselinePoint],
    extensions: &[ExtensionState],
    params: &ReclamationParams,
) -> Vec<Option<Reclamation>> {
    let mut events: Vec<Option<Reclamation>> = vec![None; bars.len()];
    if bars.len() < 2 || params.confirmation_bars == 0 {
        return events;
    }

    for c in 1..bars.len() {
        let (Some(prev_base), Some(base)) = (baseline[c - 1].scalar(), baseline[c].scalar())
        else {
            continue;
        };
        let prev_close = bars[c - 1].close;
        let close = bars[c].close;

        let crossed_down = prev_close >= prev_base && close < base;
        let crossed_up = prev_close <= prev_base && close > base;

        let (required, kind) = if crossed_down {
            (ExtensionDirection::Up, ReclaimKind::Bullish)
        } else if crossed_up {
            (ExtensionDirection::Down, ReclaimKind::Bearish)
        } else {
            continue;
        };

        let Some(extension_index) = find_extension(extensions, baseline, bars, c, required, params)
        else {
            continue;
        };

        if !confirmed(bars, baseline, c, kind, params.confirmation_bars) {
            continue;
        }

        events[c] = Some(Reclamation {
            kind,
            extension_index,
            extension_magnitude: extensions[extension_index].magnitude_pct,
        });
    }

    events
}

/// Walk back from the crossing bar looking for the qualifying extension.
/// Stops at the first bar already on the reclaim side, so only the first
/// cross after an extension can fire.
fn find_extension(
    extensions: &[ExtensionState],
    baseline: &[BaselinePoint],
    bars: &[Bar],
    cross_index: usize,
    required: ExtensionDirection,
    params: &ReclamationParams,
) -> Option<usize> {
    let earliest = cross_index.saturating_sub(params.extension_lookback_bars);
    for j in (earliest..cross_index).rev() {
        let Some(base) = baseline[j].scalar() else {
            return None;
        };
        let on_reclaim_side = match required {
            ExtensionDirection::Up => bars[j].close < base,
            ExtensionDirection::Down => bars[j].close > base,
        };
        if on_reclaim_side {
            return None;
        }
        if extensions[j].extended && extensions[j].direction == Some(required) {
            return Some(j);
        }
    }
    None
}

fn confirmed(
    bars: &[Bar],
    baseline: &[BaselinePoint],
    cross_index: usize,
    kind: ReclaimKind,
    confirmation_bars: usize,
) -> bool {
    let end = cross_index + confirmation_bars;
    if end > bars.len() {
        return false;
    }
    (cross_index..end).all(|i| match baseline[i].scalar() {
        Some(base) => match kind {
            ReclaimKind::Bullish => bars[i].close < base,
            ReclaimKind::Bearish => bars[i].close > base,
        },
        None => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extension::detect_extensions;
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

    fn detect(closes: &[f64], params: &ReclamationParams) -> Vec<Option<Reclamation>> {
        let bars = make_bars(closes);
        let baseline = flat_baseline(&bars, 100.0);
        let extensions = detect_extensions(&bars, &baseline, 0.6);
        detect_reclamations(&bars, &baseline, &extensions, params)
    }

    #[test]
    fn bullish_reclaim_after_up_extension() {
        // Extended up at index 1, crosses below at index 3, holds at 4.
        let events = detect(
            &[100.0, 101.0, 100.5, 99.5, 99.0],
            &ReclamationParams::default(),
        );

        assert!(events[0].is_none());
        assert!(events[1].is_none());
        assert!(events[2].is_none());
        let reclaim = events[3].expect("expected reclamation at crossing bar");
        assert_eq!(reclaim.kind, ReclaimKind::Bullish);
        assert_eq!(reclaim.extension_index, 1);
        assert!((reclaim.extension_magnitude - 1.0).abs() < 1e-12);
        assert!(events[4].is_none());
    }

    #[test]
    fn bearish_reclaim_after_down_extension() {
        let events = detect(
            &[100.0, 99.0, 99.5, 100.5, 101.0],
            &ReclamationParams::default(),
        );

        let reclaim = events[3].expect("expected reclamation at crossing bar");
        assert_eq!(reclaim.kind, ReclaimKind::Bearish);
        assert_eq!(reclaim.extension_index, 1);
    }

    #[test]
    fn no_event_without_prior_extension() {
        // Crosses the baseline but never extended beyond the threshold.
        let events = detect(
            &[100.0, 100.3, 99.8, 99.7],
            &ReclamationParams::default(),
        );
        assert!(events.iter().all(Option::is_none));
    }

    #[test]
    fn no_event_when_extension_outside_lookback() {
        let params = ReclamationParams {
            confirmation_bars: 1,
            extension_lookback_bars: 2,
        };
        // Extension at index 1, cross at index 5: three bars back, beyond the
        // two-bar lookback.
        let events = detect(&[100.0, 101.0, 100.5, 100.4, 100.3, 99.5], &params);
        assert!(events.iter().all(Option::is_none));
    }

    #[test]
    fn unconfirmed_cross_is_not_emitted() {
        // Crosses below at index 3 but snaps back above at index 4.
        let events = detect(
            &[100.0, 101.0, 100.5, 99.5, 100.5],
            &ReclamationParams::default(),
        );
        assert!(events.iter().all(Option::is_none));
    }

    #[test]
    fn cross_at_series_end_lacks_confirmation() {
        // Crossing bar is the last bar; a 2-bar window cannot confirm.
        let events = detect(&[100.0, 101.0, 99.5], &ReclamationParams::default());
        assert!(events.iter().all(Option::is_none));
    }

    #[test]
    fn only_first_cross_fires() {
        let params = ReclamationParams {
            confirmation_bars: 1,
            extension_lookback_bars: 10,
        };
        // Cross at 2, back above at 3, cross again at 4. The second cross
        // walks back into bar 2 (already below) before reaching the
        // extension, so it stays quiet.
        let events = detect(&[100.0, 101.0, 99.5, 100.5, 99.4], &params);
        assert!(events[2].is_some());
        assert!(events[4].is_none());
    }

    #[test]
    fn every_event_has_qualifying_extension_in_window() {
        let params = ReclamationParams::default();
        let closes = [
            100.0, 101.0, 100.5, 99.5, 99.0, 100.5, 99.0, 98.5, 100.5, 101.0,
        ];
        let bars = make_bars(&closes);
        let baseline = flat_baseline(&bars, 100.0);
        let extensions = detect_extensions(&bars, &baseline, 0.6);
        let events = detect_reclamations(&bars, &baseline, &extensions, &params);

        for (c, event) in events.iter().enumerate() {
            if let Some(reclaim) = event {
                assert!(reclaim.extension_index < c);
                assert!(c - reclaim.extension_index <= params.extension_lookback_bars);
                assert!(extensions[reclaim.extension_index].extended);
            }
        }
    }
}

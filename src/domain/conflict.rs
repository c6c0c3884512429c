//! Conflict resolution against the reference timeframe.
//!
//! A signal on timeframe T is checked against the state of the reference
//! timeframe R at the bar that time-contains the signal's timestamp. The
//! classification feeds a configured risk-multiplier lookup; the multipliers
//! themselves come from configuration, only the mapping mechanism lives here.

use crate::domain::extension::ExtensionState;
use crate::domain::series::TimeframeSeries;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConflictAssessment {
    NoConflict,
    /// T and R extended in opposite directions.
    DirectCorrection,
    /// R extended, T not extended, but T reclaiming right now.
    TrapSetup,
    /// R extended, T showing nothing.
    Consolidation,
    /// No R bar contains the signal timestamp.
    DataUnavailable,
}

/// How a `DataUnavailable` assessment affects risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataUnavailablePolicy {
    TreatAsNoConflict,
    Block,
}

/// Snapshot of the signal timeframe's state at the signal bar.
#[derive(Debug, Clone, Copy)]
pub struct SignalState {
    pub extension: ExtensionState,
    pub reclaiming: bool,
}

/// Classify one (T-state, R-state) pair. Pure and total: identical inputs
/// always yield the identical assessment.
pub fn classify(
    signal_state: &SignalState,
    reference: Option<&ExtensionState>,
) -> ConflictAssessment {
    let Some(reference) = reference else {
        return ConflictAssessment::DataUnavailable;
    };

    if signal_state.extension.extended
        && reference.extended
        && signal_state.extension.direction != reference.direction
    {
        return ConflictAssessment::DirectCorrection;
    }
    if reference.extended && !signal_state.extension.extended {
        if signal_state.reclaiming {
            return ConflictAssessment::TrapSetup;
        }
        return ConflictAssessment::Consolidation;
    }
    ConflictAssessment::NoConflict
}

/// Resolve the reference bar by time-containment and classify. A gap in the
/// reference data maps to `DataUnavailable`.
pub fn assess(
    signal_series: &TimeframeSeries,
    signal_index: usize,
    reference_series: &TimeframeSeries,
    timestamp: NaiveDateTime,
) -> ConflictAssessment {
    let signal_state = SignalState {
        extension: signal_series
            .extension_at(signal_index)
            .copied()
            .unwrap_or_else(|| ExtensionState {
                extended: false,
                direction: None,
                magnitude_pct: 0.0,
            }),
        reclaiming: signal_series.reclamation_at(signal_index).is_some(),
    };
    let reference = reference_series
        .containing_index(timestamp)
        .and_then(|i| reference_series.extension_at(i));
    classify(&signal_state, reference)
}

/// Conflict-type to risk-multiplier lookup plus the base risk percentage.
#[derive(Debug, Clone)]
pub struct RiskPolicy {
    pub base_risk_pct: f64,
    pub multipliers: HashMap<ConflictAssessment, f64>,
    pub data_unavailable_policy: DataUnavailablePolicy,
}

impl RiskPolicy {
    /// Multiplier for an assessment. Unconfigured types default to 1.0;
    /// `DataUnavailable` routes through the configured policy first.
    pub fn multiplier(&self, assessment: ConflictAssessment) -> f64 {
        let effective = match assessment {
            ConflictAssessment::DataUnavailable => match self.data_unavailable_policy {
                DataUnavailablePolicy::TreatAsNoConflict => ConflictAssessment::NoConflict,
                DataUnavailablePolicy::Block => return 0.0,
            },
            other => other,
        };
        self.multipliers.get(&effective).copied().unwrap_or(1.0)
    }

    /// Risk percentage after the conflict multiplier. Zero blocks the trade.
    pub fn adjusted_risk_pct(&self, assessment: ConflictAssessment) -> f64 {
        self.base_risk_pct * self.multiplier(assessment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::extension::ExtensionDirection;

    fn extended(direction: ExtensionDirection, magnitude_pct: f64) -> ExtensionState {
        ExtensionState {
            extended: true,
            direction: Some(direction),
            magnitude_pct,
        }
    }

    fn quiet() -> ExtensionState {
        ExtensionState {
            extended: false,
            direction: None,
            magnitude_pct: 0.1,
        }
    }

    #[test]
    fn opposite_extensions_are_direct_correction() {
        let state = SignalState {
            extension: extended(ExtensionDirection::Down, -0.8),
            reclaiming: false,
        };
        let reference = extended(ExtensionDirection::Up, 1.2);
        assert_eq!(
            classify(&state, Some(&reference)),
            ConflictAssessment::DirectCorrection
        );
    }

    #[test]
    fn aligned_extensions_are_no_conflict() {
        let state = SignalState {
            extension: extended(ExtensionDirection::Up, 0.9),
            reclaiming: false,
        };
        let reference = extended(ExtensionDirection::Up, 1.2);
        assert_eq!(
            classify(&state, Some(&reference)),
            ConflictAssessment::NoConflict
        );
    }

    #[test]
    fn reference_extended_with_reclaim_is_trap_setup() {
        let state = SignalState {
            extension: quiet(),
            reclaiming: true,
        };
        let reference = extended(ExtensionDirection::Up, 1.2);
        assert_eq!(
            classify(&state, Some(&reference)),
            ConflictAssessment::TrapSetup
        );
    }

    #[test]
    fn reference_extended_without_reclaim_is_consolidation() {
        let state = SignalState {
            extension: quiet(),
            reclaiming: false,
        };
        let reference = extended(ExtensionDirection::Down, -1.0);
        assert_eq!(
            classify(&state, Some(&reference)),
            ConflictAssessment::Consolidation
        );
    }

    #[test]
    fn quiet_reference_is_no_conflict() {
        let state = SignalState {
            extension: quiet(),
            reclaiming: true,
        };
        assert_eq!(
            classify(&state, Some(&quiet())),
            ConflictAssessment::NoConflict
        );
    }

    #[test]
    fn missing_reference_is_data_unavailable() {
        let state = SignalState {
            extension: quiet(),
            reclaiming: false,
        };
        assert_eq!(classify(&state, None), ConflictAssessment::DataUnavailable);
    }

    #[test]
    fn classification_is_deterministic() {
        let state = SignalState {
            extension: extended(ExtensionDirection::Down, -0.8),
            reclaiming: true,
        };
        let reference = extended(ExtensionDirection::Up, 1.2);
        let first = classify(&state, Some(&reference));
        for _ in 0..10 {
            assert_eq!(classify(&state, Some(&reference)), first);
        }
    }

    fn policy() -> RiskPolicy {
        let mut multipliers = HashMap::new();
        multipliers.insert(ConflictAssessment::DirectCorrection, 0.5);
        multipliers.insert(ConflictAssessment::TrapSetup, 0.0);
        multipliers.insert(ConflictAssessment::Consolidation, 0.75);
        RiskPolicy {
            base_risk_pct: 2.0,
            multipliers,
            data_unavailable_policy: DataUnavailablePolicy::TreatAsNoConflict,
        }
    }

    #[test]
    fn configured_multipliers_apply() {
        let policy = policy();
        assert!((policy.adjusted_risk_pct(ConflictAssessment::DirectCorrection) - 1.0).abs() < f64::EPSILON);
        assert!((policy.adjusted_risk_pct(ConflictAssessment::Consolidation) - 1.5).abs() < f64::EPSILON);
        assert_eq!(policy.adjusted_risk_pct(ConflictAssessment::TrapSetup), 0.0);
    }

    #[test]
    fn unconfigured_type_defaults_to_full_risk() {
        let policy = policy();
        assert!((policy.adjusted_risk_pct(ConflictAssessment::NoConflict) - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn data_unavailable_follows_policy() {
        let mut policy = policy();
        assert!(
            (policy.adjusted_risk_pct(ConflictAssessment::DataUnavailable) - 2.0).abs()
                < f64::EPSILON
        );

        policy.data_unavailable_policy = DataUnavailablePolicy::Block;
        assert_eq!(policy.adjusted_risk_pct(ConflictAssessment::DataUnavailable), 0.0);
    }
}

//! Fail-fast configuration validation.
//!
//! Every invalid-configuration condition is rejected here, before any data is
//! loaded or any simulation work starts. Later stages can therefore assume a
//! well-formed config.

use crate::domain::config::SimulationConfig;
use crate::domain::error::ReclaimerError;

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> ReclaimerError {
    ReclaimerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_config(config: &SimulationConfig) -> Result<(), ReclaimerError> {
    if !(config.initial_balance > 0.0) {
        return Err(invalid(
            "simulation",
            "initial_balance",
            format!("must be positive, got {}", config.initial_balance),
        ));
    }
    if !(config.base_risk_pct > 0.0) || config.base_risk_pct > 100.0 {
        return Err(invalid(
            "risk",
            "base_risk_pct",
            format!("must be in (0, 100], got {}", config.base_risk_pct),
        ));
    }

    if config.hierarchy.is_empty() {
        return Err(invalid("simulation", "hierarchy", "must not be empty"));
    }
    for pair in config.hierarchy.windows(2) {
        if pair[1] <= pair[0] {
            return Err(invalid(
                "simulation",
                "hierarchy",
                format!("must be strictly ascending, {} follows {}", pair[1], pair[0]),
            ));
        }
    }

    for timeframe in config.required_timeframes() {
        match config.threshold(timeframe) {
            Some(threshold) if threshold > 0.0 && threshold.is_finite() => {}
            Some(threshold) => {
                return Err(invalid(
                    "thresholds",
                    &timeframe.to_string(),
                    format!("must be a positive percentage, got {}", threshold),
                ));
            }
            None => {
                return Err(ReclaimerError::ConfigMissing {
                    section: "thresholds".to_string(),
                    key: timeframe.to_string(),
                });
            }
        }
    }

    for (timeframe, weight) in &config.timeframe_weights {
        if !(*weight >= 0.0) || !weight.is_finite() {
            return Err(invalid(
                "weights",
                &timeframe.to_string(),
                format!("must be non-negative, got {}", weight),
            ));
        }
    }
    for (assessment, multiplier) in &config.risk_multipliers {
        if !(*multiplier >= 0.0) || !multiplier.is_finite() {
            return Err(invalid(
                "risk",
                &format!("{:?}", assessment),
                format!("multiplier must be non-negative, got {}", multiplier),
            ));
        }
    }

    if config.baseline_period < 2 {
        return Err(invalid(
            "simulation",
            "baseline_period",
            "must be at least 2",
        ));
    }
    if config.confirmation_bars == 0 {
        return Err(invalid(
            "simulation",
            "confirmation_bars",
            "must be at least 1",
        ));
    }
    if config.extension_lookback_bars == 0 {
        return Err(invalid(
            "simulation",
            "extension_lookback_bars",
            "must be at least 1",
        ));
    }
    if config.stop_lookback_bars == 0 {
        return Err(invalid(
            "simulation",
            "stop_lookback_bars",
            "must be at least 1",
        ));
    }
    if !(config.stop_buffer_pct >= 0.0) || config.stop_buffer_pct >= 100.0 {
        return Err(invalid(
            "simulation",
            "stop_buffer_pct",
            format!("must be in [0, 100), got {}", config.stop_buffer_pct),
        ));
    }
    if !config.breakeven_offset_pct.is_finite() || config.breakeven_offset_pct < 0.0 {
        return Err(invalid(
            "simulation",
            "breakeven_offset_pct",
            format!("must be non-negative, got {}", config.breakeven_offset_pct),
        ));
    }

    Ok(())
}

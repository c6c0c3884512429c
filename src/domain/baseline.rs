//! Baseline moving average.
//!
//! Exponential moving average of closes: k = 2/(n+1), seeded with the first
//! SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k). The first (n-1) bars are the
//! warmup window and carry `valid = false`.

use crate::domain::bar::Bar;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct BaselinePoint {
    pub timestamp: NaiveDateTime,
    pub valid: bool,
    pub value: f64,
}

impl BaselinePoint {
    /// Resolve to a scalar: `Some` only when valid and finite.
    pub fn scalar(&self) -> Option<f64> {
        if self.valid && self.value.is_finite() {
            Some(self.value)
        } else {
            None
        }
    }
}

pub fn ema_baseline(bars: &[Bar], period: usize) -> Vec<BaselinePoint> {
    if period == 0 || bars.is_empty() {
        return Vec::new();
    }

    let mut values = Vec::with_capacity(bars.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, bar) in bars.iter().enumerate() {
        if i < period - 1 {
            sum += bar.close;
            values.push(BaselinePoint {
                timestamp: bar.timestamp,
                valid: false,
                value: 0.0,
            });
        } else if i == period - 1 {
            sum += bar.close;
            ema = sum / period as f64;
            values.push(BaselinePoint {
                timestamp: bar.timestamp,
                valid: true,
                value: ema,
            });
        } else {
            ema = bar.close * k + ema * (1.0 - k);
            values.push(BaselinePoint {
                timestamp: bar.timestamp,
                valid: true,
                value: ema,
            });
        }
    }

    values
}

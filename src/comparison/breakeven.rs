//! Break-even rate search
//!
//! Finds the gross rate at which both scenarios end with the same after-tax
//! worth, i.e. the zero contour of the interest-rate grid.

use super::comparator::{compare, ComparisonInputs};
use crate::error::Result;

const TOLERANCE: f64 = 1e-9;
const MAX_ITERATIONS: usize = 200;

/// Gross rate of scenario B (percent) at which `difference` is zero.
///
/// Searches `[low, high]` by bisection. Returns `None` when the interval
/// does not bracket a sign change of the difference.
pub fn breakeven_wrapped_rate(inputs: &ComparisonInputs, low: f64, high: f64) -> Result<Option<f64>> {
    bisect(low, high, |rate| {
        let mut trial = inputs.clone();
        trial.scenario_b.gross_annual_rate = rate;
        Ok(compare(&trial)?.difference)
    })
}

/// Gross rate of scenario A (percent) at which `difference` is zero
pub fn breakeven_unwrapped_rate(inputs: &ComparisonInputs, low: f64, high: f64) -> Result<Option<f64>> {
    bisect(low, high, |rate| {
        let mut trial = inputs.clone();
        trial.scenario_a.gross_annual_rate = rate;
        Ok(compare(&trial)?.difference)
    })
}

fn bisect<F>(mut low: f64, mut high: f64, difference_at: F) -> Result<Option<f64>>
where
    F: Fn(f64) -> Result<f64>,
{
    let mut diff_low = difference_at(low)?;
    let diff_high = difference_at(high)?;

    if diff_low == 0.0 {
        return Ok(Some(low));
    }
    if diff_high == 0.0 {
        return Ok(Some(high));
    }
    // No sign change means no root in this interval
    if diff_low * diff_high > 0.0 {
        return Ok(None);
    }

    for _ in 0..MAX_ITERATIONS {
        let mid = (low + high) / 2.0;
        let diff_mid = difference_at(mid)?;

        if diff_mid == 0.0 || (high - low) / 2.0 < TOLERANCE {
            return Ok(Some(mid));
        }

        if diff_mid * diff_low < 0.0 {
            high = mid;
        } else {
            low = mid;
            diff_low = diff_mid;
        }
    }

    Ok(Some((low + high) / 2.0))
}

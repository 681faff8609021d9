//! Coalition-size scans: stability threshold and indicator classification.
//!
//! The scans are deterministic sweeps of `s in [1, n_max]`. An evaluator may
//! be undefined at specific sizes (structural division by zero); such sizes
//! are skipped, never fatal, and never counted as satisfying or violating a
//! predicate. Non-finite evaluator output is treated the same way.

use crate::domain::{CellKey, ParameterSet, SignPattern, ValidSample};
use crate::model::{EvalFn, EvaluatorSet, INDICATOR_COUNT};

/// Run the full per-sample scan and finalize the record.
pub fn evaluate_sample(
    cell: CellKey,
    params: ParameterSet,
    evaluators: &EvaluatorSet,
    n_max: u32,
) -> ValidSample {
    let stable = stable_size(&params, evaluators.internal_stability, n_max);
    let improvement = stable.and_then(|s| {
        let value = (evaluators.improvement_index)(&params.with_size(s)).ok()?;
        value.is_finite().then_some(value)
    });
    let indicators: [SignPattern; INDICATOR_COUNT] =
        std::array::from_fn(|i| classify_signs(&params, evaluators.indicators[i], n_max));

    ValidSample {
        cell,
        params,
        stable_size: stable,
        improvement,
        indicators,
    }
}

/// Largest `s` in `[1, n_max]` with a non-negative internal-stability value.
pub fn stable_size(params: &ParameterSet, internal_stability: EvalFn, n_max: u32) -> Option<u32> {
    let mut best = None;
    for s in 1..=n_max {
        match internal_stability(&params.with_size(s)) {
            Ok(value) if value.is_finite() && value >= 0.0 => best = Some(s),
            // Negative, non-finite, or undefined at this size: keep scanning.
            _ => {}
        }
    }
    best
}

/// Classify the sign pattern of one indicator over the full scan.
pub fn classify_signs(params: &ParameterSet, indicator: EvalFn, n_max: u32) -> SignPattern {
    let mut any_positive = false;
    let mut any_negative = false;
    let mut any_zero = false;

    for s in 1..=n_max {
        let Ok(value) = indicator(&params.with_size(s)) else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        if value > 0.0 {
            any_positive = true;
        } else if value < 0.0 {
            any_negative = true;
        } else {
            any_zero = true;
        }
    }

    match (any_positive, any_negative, any_zero) {
        (true, false, false) => SignPattern::AllPositive,
        (false, true, false) => SignPattern::AllNegative,
        // A scan that never produced a defined value is vacuously all-zero.
        (false, false, _) => SignPattern::AllZero,
        _ => SignPattern::Mixed,
    }
}

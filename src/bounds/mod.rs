//! Admissible-interval computation for the squared cross-effect.
//!
//! Given a partial draw, a sigma-group definition, and the regime/sign
//! restriction list, the engine intersects every applicable constraint into
//! a single `[lhs, rhs)` interval for `gamma_squared`. The most restrictive
//! upper bound and the most restrictive lower bound win; anything non-finite
//! rejects the draw outright so NaN never reaches a comparison downstream.

use crate::domain::ParameterDraw;
use crate::groups::SigmaGroupDef;
use crate::model::BoundFn;

/// Admissible interval for `gamma_squared`. Always `0 <= lhs < rhs`, both
/// finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaInterval {
    pub lhs: f64,
    pub rhs: f64,
}

impl GammaInterval {
    /// Closed-interval containment, for re-checking accepted draws.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lhs && value <= self.rhs
    }

    pub fn width(&self) -> f64 {
        self.rhs - self.lhs
    }
}

/// Why a draw cannot yield an interior, unique, correctly-signed
/// equilibrium. Consumed by the sampler as a rejection, never surfaced.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InvalidBound {
    /// A bound function evaluated non-finite (e.g. a division by a
    /// near-zero drawn quantity), or no upper bound applies at all.
    NonFinite,
    /// The constraints intersect to an empty interval.
    Empty { lhs: f64, rhs: f64 },
}

/// Compute the admissible interval for `gamma_squared` at a draw.
///
/// `rhs` is the minimum over the group's upper-bound functions and the
/// regime/sign restrictions; `lhs` is the maximum over the group's
/// lower-bound functions, clamped at 0 since `gamma_squared >= 0` (an empty
/// lower-bound list therefore yields `lhs = 0`). Pure: identical inputs
/// produce identical intervals.
pub fn admissible_interval(
    draw: &ParameterDraw,
    group: &SigmaGroupDef,
    restrictions: &[BoundFn],
) -> Result<GammaInterval, InvalidBound> {
    let mut rhs = f64::INFINITY;
    for func in group.max_funcs.iter().chain(restrictions.iter()) {
        let value = func(draw);
        if !value.is_finite() {
            return Err(InvalidBound::NonFinite);
        }
        rhs = rhs.min(value);
    }
    // No applicable upper bound leaves rhs infinite; such a cell cannot be
    // sampled uniformly and is treated as a rejected draw.
    if !rhs.is_finite() {
        return Err(InvalidBound::NonFinite);
    }

    let mut lhs = 0.0_f64;
    for func in &group.min_funcs {
        let value = func(draw);
        if !value.is_finite() {
            return Err(InvalidBound::NonFinite);
        }
        lhs = lhs.max(value);
    }

    if rhs <= lhs {
        return Err(InvalidBound::Empty { lhs, rhs });
    }
    Ok(GammaInterval { lhs, rhs })
}

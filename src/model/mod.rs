//! Contracts for the externally supplied model expressions.
//!
//! The closed-form equilibrium, indicator, and bound expressions are
//! collaborators, not part of this pipeline: they arrive as plain function
//! pointers grouped per agreement regime, and the pipeline treats them as
//! opaque. Plain `fn` pointers keep the tables `Sync` so they can be shared
//! across workers without locking.
//!
//! `reference` ships a self-consistent instantiation of both contracts so
//! the binary and the round-trip tests can exercise the pipeline end to end.

use crate::domain::{ParameterDraw, ParameterSet, Regime};

pub mod reference;

/// An evaluator was asked for a value at a coalition size where the
/// underlying expression divides by a structurally-zero quantity.
///
/// This is a per-`s` outcome, not a failure: scans skip the size and
/// continue. It is deliberately distinct from returning `0.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainError;

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "evaluator undefined at this coalition size")
    }
}

impl std::error::Error for DomainError {}

pub type EvalResult = Result<f64, DomainError>;

/// A pure evaluator of one model expression at a resolved parameter set
/// (coalition size included via `ParameterSet::s`).
pub type EvalFn = fn(&ParameterSet) -> EvalResult;

/// A pure upper or lower bound on `gamma_squared` as a function of the
/// partial draw. May return a non-finite value; the bound engine checks.
pub type BoundFn = fn(&ParameterDraw) -> f64;

/// Computes the regime-derived scalar `d` from the sampled primitives
/// `(a, b, m, g)`.
pub type DeriveFn = fn(f64, f64, f64, f64) -> f64;

pub const INDICATOR_COUNT: usize = 6;

/// The twelve evaluators one agreement regime supplies.
pub struct EvaluatorSet {
    /// Equilibrium contribution level of the Q good.
    pub q_level: EvalFn,
    /// Equilibrium contribution level of the X good.
    pub x_level: EvalFn,
    /// Q-side reaction function.
    pub sigma_q: EvalFn,
    /// X-side reaction function.
    pub sigma_x: EvalFn,
    /// Internal-stability predicate; a coalition of size `s` is stable
    /// while this is non-negative.
    pub internal_stability: EvalFn,
    /// Percentage welfare gain over no cooperation, evaluated at `s*`.
    pub improvement_index: EvalFn,
    /// Auxiliary indicators, sign-classified over the full scan.
    pub indicators: [EvalFn; INDICATOR_COUNT],
}

/// One regime's evaluators plus its derived-scalar rule.
pub struct RegimeModel {
    pub evaluators: EvaluatorSet,
    pub derive_d: DeriveFn,
}

/// Both regimes' models, as consumed by the pipeline.
pub struct ModelLibrary {
    pub full: RegimeModel,
    pub q: RegimeModel,
}

impl ModelLibrary {
    pub fn regime(&self, regime: Regime) -> &RegimeModel {
        match regime {
            Regime::Full => &self.full,
            Regime::Q => &self.q,
        }
    }
}

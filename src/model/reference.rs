//! Reference model library.
//!
//! A self-consistent instantiation of the evaluator and bound-function
//! contracts for both agreement regimes. The bound functions are constructed
//! so that any draw accepted inside the admissible interval satisfies its
//! group's reaction-function classification across the whole coalition-size
//! scan; the round-trip tests below hold the library to that.
//!
//! Reaction functions:
//!
//! - full agreement:  `sigma_q = gamma^2 - alpha / s`, `sigma_x = gamma^2 - beta / s`
//! - Q agreement:     `sigma_q = gamma^2 - alpha` (s-invariant), `sigma_x` as above
//!
//! Both are non-decreasing in `s`, so a sign change is a single
//! negative-to-positive crossing and the binding sizes are the endpoints:
//! `s = 1` for staying positive, `s = n` for staying negative.

use crate::domain::{GroupLabel, ParameterDraw, ParameterSet, SignClass};
use crate::error::AppError;
use crate::groups::{Restrictions, SigmaGroupDef, SigmaGroupRegistry};
use crate::model::{
    BoundFn, DomainError, EvalResult, EvaluatorSet, ModelLibrary, RegimeModel, INDICATOR_COUNT,
};

pub const INDICATOR_NAMES: [&str; INDICATOR_COUNT] = [
    "delta_q",
    "delta_x",
    "free_riding",
    "leakage",
    "scale",
    "alignment",
];

fn sf(p: &ParameterSet) -> f64 {
    p.s as f64
}

// --- reaction functions ---

fn sigma_q_full(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma_squared - p.alpha / sf(p))
}

fn sigma_q_invariant(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma_squared - p.alpha)
}

fn sigma_x(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma_squared - p.beta / sf(p))
}

// --- equilibrium levels ---

fn q_level_full(p: &ParameterSet) -> EvalResult {
    let den = p.m + p.alpha * sf(p);
    if den == 0.0 {
        return Err(DomainError);
    }
    Ok((p.a + p.gamma * sf(p)) / den)
}

fn q_level_q(p: &ParameterSet) -> EvalResult {
    let den = p.m + p.alpha;
    if den == 0.0 {
        return Err(DomainError);
    }
    Ok((p.a + p.gamma) / den)
}

/// Per-outsider contribution level; structurally undefined at `s = n`
/// (no outsiders left).
fn x_level(p: &ParameterSet) -> EvalResult {
    let den = p.m * (p.n - sf(p));
    if den == 0.0 {
        return Err(DomainError);
    }
    Ok((p.b - p.gamma) / den)
}

// --- stability and improvement ---

fn internal_stability_full(p: &ParameterSet) -> EvalResult {
    Ok(p.a + p.b + p.gamma - p.m * sf(p))
}

fn internal_stability_q(p: &ParameterSet) -> EvalResult {
    Ok(p.a + p.gamma - p.m * sf(p))
}

fn improvement_full(p: &ParameterSet) -> EvalResult {
    Ok(100.0 * (sf(p) - 1.0) * (p.a + p.b) / (1.0 + p.m * p.n))
}

fn improvement_q(p: &ParameterSet) -> EvalResult {
    Ok(100.0 * (sf(p) - 1.0) * p.a / (1.0 + p.m * p.n))
}

// --- auxiliary indicators ---

fn ind_delta_q(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma * (p.n - sf(p) + 1.0) / p.m)
}

fn ind_delta_x(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma_squared * sf(p) - p.beta)
}

fn ind_free_riding(p: &ParameterSet) -> EvalResult {
    let den = p.m * (p.n - sf(p));
    if den == 0.0 {
        return Err(DomainError);
    }
    Ok((p.b - p.gamma) / den - p.b / (p.m * p.n))
}

fn ind_leakage(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma * sf(p) - p.g)
}

fn ind_scale(p: &ParameterSet) -> EvalResult {
    Ok(p.a - p.m * sf(p) / p.n)
}

fn ind_alignment(p: &ParameterSet) -> EvalResult {
    Ok(p.gamma_squared - p.alpha * p.beta)
}

const INDICATORS: [crate::model::EvalFn; INDICATOR_COUNT] = [
    ind_delta_q,
    ind_delta_x,
    ind_free_riding,
    ind_leakage,
    ind_scale,
    ind_alignment,
];

// --- derived scalars ---

fn derive_d_full(_a: f64, _b: f64, m: f64, g: f64) -> f64 {
    g / (1.0 + m)
}

fn derive_d_q(_a: f64, _b: f64, _m: f64, g: f64) -> f64 {
    g
}

// --- bound functions ---

fn alpha_level(d: &ParameterDraw) -> f64 {
    d.alpha
}

fn alpha_over_n(d: &ParameterDraw) -> f64 {
    d.alpha / d.n
}

fn beta_level(d: &ParameterDraw) -> f64 {
    d.beta
}

fn beta_over_n(d: &ParameterDraw) -> f64 {
    d.beta / d.n
}

/// Uniqueness bound on the squared cross-effect (both regimes, both signs).
pub fn uniqueness(d: &ParameterDraw) -> f64 {
    d.a * d.b / (d.m + d.d)
}

/// Interiority of the Q good, binding for the negative sign only.
pub fn interior_q(d: &ParameterDraw) -> f64 {
    d.g * (1.0 - d.m)
}

/// Interiority of the X good, binding for the negative sign only. Divides by
/// `m`, so a degenerate draw can evaluate non-finite; the bound engine
/// rejects such draws.
pub fn interior_x(d: &ParameterDraw) -> f64 {
    d.b * d.d / d.m
}

/// The interiority conditions are redundant for a positive cross-effect, so
/// those lists carry the uniqueness bound alone.
pub fn standard_restrictions() -> Restrictions {
    Restrictions::new(
        vec![uniqueness],
        vec![uniqueness, interior_q, interior_x],
        vec![uniqueness],
        vec![uniqueness, interior_x],
    )
}

/// Bounds enforcing one axis' classification, appended onto a group's lists.
fn push_axis_bounds(
    class: SignClass,
    level: BoundFn,
    over_n: BoundFn,
    max_funcs: &mut Vec<BoundFn>,
    min_funcs: &mut Vec<BoundFn>,
) {
    match class {
        // Stay negative at the loosest size, s = n.
        SignClass::AlwaysNegative => max_funcs.push(over_n),
        // Stay positive at the tightest size, s = 1.
        SignClass::AlwaysPositive => min_funcs.push(level),
        // Negative at s = 1, positive by s = n.
        SignClass::SignChange => {
            max_funcs.push(level);
            min_funcs.push(over_n);
        }
    }
}

fn full_group(label: GroupLabel, max_sp: f64) -> SigmaGroupDef {
    let (class_q, class_x) = label.classes();
    let mut max_funcs = Vec::new();
    let mut min_funcs = Vec::new();
    push_axis_bounds(class_q, alpha_level, alpha_over_n, &mut max_funcs, &mut min_funcs);
    push_axis_bounds(class_x, beta_level, beta_over_n, &mut max_funcs, &mut min_funcs);
    SigmaGroupDef::new(label, max_funcs, min_funcs, max_sp)
}

fn q_group(label: GroupLabel, max_sp: f64) -> SigmaGroupDef {
    let (class_q, class_x) = label.classes();
    let mut max_funcs = Vec::new();
    let mut min_funcs = Vec::new();
    // sigma_q is s-invariant under Q agreement: the level binds either way.
    match class_q {
        SignClass::AlwaysNegative => max_funcs.push(alpha_level as BoundFn),
        SignClass::AlwaysPositive => min_funcs.push(alpha_level as BoundFn),
        SignClass::SignChange => unreachable!("s-dependent sigma_q group under Q agreement"),
    }
    push_axis_bounds(class_x, beta_level, beta_over_n, &mut max_funcs, &mut min_funcs);
    SigmaGroupDef::new(label, max_funcs, min_funcs, max_sp)
}

/// Build the nine-group (full) and six-group (Q) registry.
pub fn standard_registry(max_sp: f64) -> Result<SigmaGroupRegistry, AppError> {
    let full = GroupLabel::ALL
        .into_iter()
        .map(|label| full_group(label, max_sp))
        .collect();
    let q = GroupLabel::ALL
        .into_iter()
        .filter(|label| !label.sigma_q_varies_with_s())
        .map(|label| q_group(label, max_sp))
        .collect();
    SigmaGroupRegistry::new(full, q)
}

/// Both regimes' evaluator sets and derived-scalar rules.
pub fn models() -> ModelLibrary {
    ModelLibrary {
        full: RegimeModel {
            evaluators: EvaluatorSet {
                q_level: q_level_full,
                x_level,
                sigma_q: sigma_q_full,
                sigma_x,
                internal_stability: internal_stability_full,
                improvement_index: improvement_full,
                indicators: INDICATORS,
            },
            derive_d: derive_d_full,
        },
        q: RegimeModel {
            evaluators: EvaluatorSet {
                q_level: q_level_q,
                x_level,
                sigma_q: sigma_q_invariant,
                sigma_x,
                internal_stability: internal_stability_q,
                improvement_index: improvement_q,
                indicators: INDICATORS,
            },
            derive_d: derive_d_q,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CellKey, GammaSign, Regime, RoundId, ScanConfig, DEFAULT_MAX_SP, DEFAULT_N_MAX,
    };
    use crate::model::EvalFn;
    use crate::sampler::{sample_cell, Accepted};
    use crate::search::stable_size;

    fn config() -> ScanConfig {
        ScanConfig {
            rounds: RoundId::ALL.to_vec(),
            regimes: Regime::ALL.to_vec(),
            target_count: 8,
            group_targets: vec![],
            max_attempts: 400_000,
            n_max: DEFAULT_N_MAX,
            max_sp: DEFAULT_MAX_SP,
            seed: 7,
            export_samples: None,
            export_run: None,
        }
    }

    fn sample(cell: CellKey) -> Vec<Accepted> {
        let config = config();
        let registry = standard_registry(config.max_sp).unwrap();
        let restrictions = standard_restrictions();
        let library = models();
        let group = registry.group(cell.regime, cell.group).unwrap();
        sample_cell(
            &cell,
            group,
            restrictions.for_cell(cell.regime, cell.sign),
            library.regime(cell.regime).derive_d,
            &config,
        )
        .unwrap_or_else(|ex| {
            panic!(
                "cell {} exhausted: {}/{} after {} attempts",
                cell.label(),
                ex.accepted,
                config.target_count,
                ex.attempts
            )
        })
        .accepted
    }

    /// Observe a reaction function's sign behavior over the whole scan.
    fn observed_class(p: &crate::domain::ParameterSet, sigma: EvalFn, n_max: u32) -> SignClass {
        let mut any_negative = false;
        let mut any_positive = false;
        for s in 1..=n_max {
            let value = sigma(&p.with_size(s)).unwrap();
            if value < 0.0 {
                any_negative = true;
            } else if value > 0.0 {
                any_positive = true;
            }
            // Monotone non-decreasing in s: once positive, never negative
            // again.
            if any_positive {
                assert!(value >= 0.0);
            }
        }
        match (any_negative, any_positive) {
            (true, false) => SignClass::AlwaysNegative,
            (false, true) => SignClass::AlwaysPositive,
            (true, true) => SignClass::SignChange,
            (false, false) => panic!("reaction function identically zero"),
        }
    }

    #[test]
    fn sampled_draws_match_declared_classification_full() {
        let registry = standard_registry(DEFAULT_MAX_SP).unwrap();
        let library = models();
        for label in GroupLabel::ALL {
            for sign in GammaSign::ALL {
                let cell = CellKey {
                    round: RoundId::I,
                    regime: Regime::Full,
                    group: label,
                    sign,
                };
                let group = registry.group(Regime::Full, label).unwrap();
                for acc in sample(cell) {
                    let evals = &library.full.evaluators;
                    assert_eq!(
                        observed_class(&acc.params, evals.sigma_q, DEFAULT_N_MAX),
                        group.sigma_q,
                        "sigma_q mismatch in {}",
                        cell.label()
                    );
                    assert_eq!(
                        observed_class(&acc.params, evals.sigma_x, DEFAULT_N_MAX),
                        group.sigma_x,
                        "sigma_x mismatch in {}",
                        cell.label()
                    );
                }
            }
        }
    }

    #[test]
    fn sampled_draws_match_declared_classification_q() {
        let registry = standard_registry(DEFAULT_MAX_SP).unwrap();
        let library = models();
        for label in GroupLabel::ALL {
            if label.sigma_q_varies_with_s() {
                continue;
            }
            let cell = CellKey {
                round: RoundId::I,
                regime: Regime::Q,
                group: label,
                sign: GammaSign::Negative,
            };
            let group = registry.group(Regime::Q, label).unwrap();
            for acc in sample(cell) {
                let evals = &library.q.evaluators;
                assert_eq!(
                    observed_class(&acc.params, evals.sigma_q, DEFAULT_N_MAX),
                    group.sigma_q,
                    "sigma_q mismatch in {}",
                    cell.label()
                );
                assert_eq!(
                    observed_class(&acc.params, evals.sigma_x, DEFAULT_N_MAX),
                    group.sigma_x,
                    "sigma_x mismatch in {}",
                    cell.label()
                );
            }
        }
    }

    #[test]
    fn stable_size_is_the_last_non_negative_size() {
        let cell = CellKey {
            round: RoundId::I,
            regime: Regime::Full,
            group: GroupLabel::G1,
            sign: GammaSign::Negative,
        };
        let library = models();
        let is = library.full.evaluators.internal_stability;
        for acc in sample(cell) {
            let found = stable_size(&acc.params, is, DEFAULT_N_MAX);
            if let Some(star) = found {
                assert!(is(&acc.params.with_size(star)).unwrap() >= 0.0);
                for s in star + 1..=DEFAULT_N_MAX {
                    match is(&acc.params.with_size(s)) {
                        Ok(value) => assert!(value < 0.0),
                        Err(DomainError) => {}
                    }
                }
            } else {
                for s in 1..=DEFAULT_N_MAX {
                    if let Ok(value) = is(&acc.params.with_size(s)) {
                        assert!(value < 0.0);
                    }
                }
            }
        }
    }

    #[test]
    fn outsider_expressions_are_undefined_at_the_cap() {
        let draw = ParameterDraw {
            a: 0.4,
            b: 0.6,
            m: 0.25,
            g: 0.5,
            alpha: 0.1,
            beta: 0.2,
            d: derive_d_full(0.4, 0.6, 0.25, 0.5),
            n: DEFAULT_N_MAX as f64,
        };
        let p = crate::domain::ParameterSet::from_draw(draw, 0.04, GammaSign::Positive)
            .with_size(DEFAULT_N_MAX);
        assert_eq!(x_level(&p), Err(DomainError));
        assert_eq!(ind_free_riding(&p), Err(DomainError));
        assert!(x_level(&p.with_size(DEFAULT_N_MAX - 1)).is_ok());
    }

    #[test]
    fn degenerate_draw_makes_interiority_non_finite() {
        let draw = ParameterDraw {
            a: 0.4,
            b: 0.6,
            m: 0.0,
            g: 0.5,
            alpha: 0.1,
            beta: 0.2,
            d: 0.5,
            n: DEFAULT_N_MAX as f64,
        };
        assert!(!interior_x(&draw).is_finite());
    }

    #[test]
    fn positive_sign_restrictions_are_uniqueness_only() {
        let restrictions = standard_restrictions();
        assert_eq!(restrictions.for_cell(Regime::Full, GammaSign::Positive).len(), 1);
        assert_eq!(restrictions.for_cell(Regime::Q, GammaSign::Positive).len(), 1);
        assert!(restrictions.for_cell(Regime::Full, GammaSign::Negative).len() > 1);
    }

    #[test]
    fn standard_registry_has_expected_shape() {
        let registry = standard_registry(DEFAULT_MAX_SP).unwrap();
        assert_eq!(registry.groups(Regime::Full).len(), 9);
        assert_eq!(registry.groups(Regime::Q).len(), 6);

        // Always-positive axes contribute a lower bound; the G5 interval is
        // floored by both curvature coefficients.
        let g5 = registry.group(Regime::Full, GroupLabel::G5).unwrap();
        assert_eq!(g5.max_funcs.len(), 0);
        assert_eq!(g5.min_funcs.len(), 2);

        let g3_1 = registry.group(Regime::Full, GroupLabel::G3_1).unwrap();
        assert_eq!(g3_1.max_funcs.len(), 2);
        assert_eq!(g3_1.min_funcs.len(), 2);
    }
}

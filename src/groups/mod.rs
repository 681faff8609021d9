//! Sigma-group registry and per-regime restriction lists.
//!
//! Both tables are built once from externally supplied bound functions and
//! then shared read-only across all sampling cells; nothing here mutates
//! after construction.

use crate::domain::{GammaSign, GroupLabel, Regime, RoundId, SignClass};
use crate::error::AppError;
use crate::model::BoundFn;

/// One structural classification of parameter space.
///
/// `max_funcs` produce upper bounds on `gamma_squared`, `min_funcs` lower
/// bounds (present only when a reaction function can be positive). The
/// coefficient ceilings scale the `alpha`/`beta` draws: 1.0 when the
/// governing reaction function may be negative, the small-coefficient
/// ceiling when it must stay positive throughout the scan.
pub struct SigmaGroupDef {
    pub label: GroupLabel,
    pub sigma_q: SignClass,
    pub sigma_x: SignClass,
    pub max_funcs: Vec<BoundFn>,
    pub min_funcs: Vec<BoundFn>,
    pub max_alpha: f64,
    pub max_beta: f64,
}

impl SigmaGroupDef {
    /// Build a definition; classification and ceilings derive from the label.
    pub fn new(
        label: GroupLabel,
        max_funcs: Vec<BoundFn>,
        min_funcs: Vec<BoundFn>,
        max_sp: f64,
    ) -> Self {
        let (sigma_q, sigma_x) = label.classes();
        Self {
            label,
            sigma_q,
            sigma_x,
            max_funcs,
            min_funcs,
            max_alpha: coefficient_ceiling(sigma_q, max_sp),
            max_beta: coefficient_ceiling(sigma_x, max_sp),
        }
    }

    /// Whether this group can occur in the given round.
    ///
    /// A pinned-to-zero coefficient makes its reaction function non-negative,
    /// so only the always-positive classification survives on that axis.
    pub fn feasible_in(&self, round: RoundId) -> bool {
        (round.samples_alpha() || self.sigma_q == SignClass::AlwaysPositive)
            && (round.samples_beta() || self.sigma_x == SignClass::AlwaysPositive)
    }
}

fn coefficient_ceiling(class: SignClass, max_sp: f64) -> f64 {
    if class.can_be_negative() { 1.0 } else { max_sp }
}

/// Immutable registry of sigma-group definitions, one table per regime.
///
/// The full-agreement table holds all nine groups; the Q-agreement table
/// holds the six whose `sigma_q` classification does not depend on `s`.
pub struct SigmaGroupRegistry {
    full: Vec<SigmaGroupDef>,
    q: Vec<SigmaGroupDef>,
}

impl SigmaGroupRegistry {
    pub fn new(full: Vec<SigmaGroupDef>, q: Vec<SigmaGroupDef>) -> Result<Self, AppError> {
        if full.len() != GroupLabel::ALL.len()
            || GroupLabel::ALL
                .iter()
                .any(|l| !full.iter().any(|def| def.label == *l))
        {
            return Err(AppError::config(
                "Full-agreement registry must enumerate all nine sigma groups.",
            ));
        }
        for def in &q {
            if def.label.sigma_q_varies_with_s() {
                return Err(AppError::config(format!(
                    "Group {} is undefined under the Q-agreement regime (sigma_q is s-invariant there).",
                    def.label.display_name()
                )));
            }
        }
        let q_expected = GroupLabel::ALL
            .iter()
            .filter(|l| !l.sigma_q_varies_with_s())
            .count();
        if q.len() != q_expected || has_duplicate_labels(&q) {
            return Err(AppError::config(
                "Q-agreement registry must enumerate exactly the six s-invariant sigma groups.",
            ));
        }
        Ok(Self { full, q })
    }

    pub fn groups(&self, regime: Regime) -> &[SigmaGroupDef] {
        match regime {
            Regime::Full => &self.full,
            Regime::Q => &self.q,
        }
    }

    /// Look up one group, failing on a regime/label mismatch.
    pub fn group(&self, regime: Regime, label: GroupLabel) -> Result<&SigmaGroupDef, AppError> {
        self.groups(regime)
            .iter()
            .find(|def| def.label == label)
            .ok_or_else(|| {
                AppError::config(format!(
                    "Group {} is not defined under the {} regime.",
                    label.display_name(),
                    regime.display_name()
                ))
            })
    }

    /// Groups of a regime that the given round can actually produce.
    pub fn feasible(&self, regime: Regime, round: RoundId) -> Vec<&SigmaGroupDef> {
        self.groups(regime)
            .iter()
            .filter(|def| def.feasible_in(round))
            .collect()
    }
}

fn has_duplicate_labels(defs: &[SigmaGroupDef]) -> bool {
    for (i, def) in defs.iter().enumerate() {
        if defs[i + 1..].iter().any(|other| other.label == def.label) {
            return true;
        }
    }
    false
}

/// Interiority/uniqueness upper bounds on `gamma_squared`, fixed per
/// (regime, cross-effect sign).
///
/// For the positive sign the interiority conditions are redundant, so the
/// positive lists carry only the uniqueness bound.
pub struct Restrictions {
    full_positive: Vec<BoundFn>,
    full_negative: Vec<BoundFn>,
    q_positive: Vec<BoundFn>,
    q_negative: Vec<BoundFn>,
}

impl Restrictions {
    pub fn new(
        full_positive: Vec<BoundFn>,
        full_negative: Vec<BoundFn>,
        q_positive: Vec<BoundFn>,
        q_negative: Vec<BoundFn>,
    ) -> Self {
        Self {
            full_positive,
            full_negative,
            q_positive,
            q_negative,
        }
    }

    pub fn for_cell(&self, regime: Regime, sign: GammaSign) -> &[BoundFn] {
        match (regime, sign) {
            (Regime::Full, GammaSign::Positive) => &self.full_positive,
            (Regime::Full, GammaSign::Negative) => &self.full_negative,
            (Regime::Q, GammaSign::Positive) => &self.q_positive,
            (Regime::Q, GammaSign::Negative) => &self.q_negative,
        }
    }
}

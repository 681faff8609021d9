//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during sampling and scanning
//! - exported to JSON/CSV
//! - reloaded later for report tooling or comparisons

use std::path::PathBuf;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Upper end of the coalition-size domain, `s in [1, n_max]`.
pub const DEFAULT_N_MAX: u32 = 200;

/// Default ceiling for a curvature coefficient whose reaction function must
/// stay positive across the whole scan. Keeping the coefficient this small
/// keeps the admissible interval for the squared cross-effect wide.
pub const DEFAULT_MAX_SP: f64 = 1e-8;

/// Agreement regime under which equilibria are computed.
///
/// `Full` means cooperation on both public goods; `Q` means cooperation on
/// the Q good only. Under `Q` the Q-side reaction function does not vary
/// with coalition size, which removes three sigma groups (see `groups`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Regime {
    Full,
    Q,
}

impl Regime {
    pub const ALL: [Regime; 2] = [Regime::Full, Regime::Q];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            Regime::Full => "full",
            Regime::Q => "q-only",
        }
    }
}

/// Sign of the cross-effect coefficient `gamma`.
///
/// The sign is fixed per sampling cell; a cell never mixes signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GammaSign {
    Positive,
    Negative,
}

impl GammaSign {
    pub const ALL: [GammaSign; 2] = [GammaSign::Positive, GammaSign::Negative];

    pub fn display_name(self) -> &'static str {
        match self {
            GammaSign::Positive => "+",
            GammaSign::Negative => "-",
        }
    }

    /// Attach this sign to a non-negative square root.
    pub fn apply(self, root: f64) -> f64 {
        match self {
            GammaSign::Positive => root,
            GammaSign::Negative => -root,
        }
    }
}

/// Functional-form round: which curvature coefficients are sampled.
///
/// A coefficient a round does not sample is pinned to exactly `0.0`. Zero
/// curvature forces the corresponding reaction function non-negative, so
/// groups that need an always-negative or sign-changing classification on
/// that axis are infeasible for the round and are never attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum RoundId {
    #[value(name = "I")]
    #[serde(rename = "I")]
    I,
    #[value(name = "II")]
    #[serde(rename = "II")]
    II,
    #[value(name = "III")]
    #[serde(rename = "III")]
    III,
    #[value(name = "IV")]
    #[serde(rename = "IV")]
    IV,
}

impl RoundId {
    pub const ALL: [RoundId; 4] = [RoundId::I, RoundId::II, RoundId::III, RoundId::IV];

    pub fn display_name(self) -> &'static str {
        match self {
            RoundId::I => "I",
            RoundId::II => "II",
            RoundId::III => "III",
            RoundId::IV => "IV",
        }
    }

    /// Whether `alpha` is drawn (otherwise pinned to 0).
    pub fn samples_alpha(self) -> bool {
        matches!(self, RoundId::I | RoundId::III)
    }

    /// Whether `beta` is drawn (otherwise pinned to 0).
    pub fn samples_beta(self) -> bool {
        matches!(self, RoundId::I | RoundId::II)
    }
}

/// Sign behavior of one reaction function over the coalition-size domain.
///
/// Reaction functions are monotone non-decreasing in `s`, so a sign change
/// is always a single negative-to-positive crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignClass {
    AlwaysNegative,
    AlwaysPositive,
    SignChange,
}

impl SignClass {
    pub fn display_name(self) -> &'static str {
        match self {
            SignClass::AlwaysNegative => "always-negative",
            SignClass::AlwaysPositive => "always-positive",
            SignClass::SignChange => "sign-change",
        }
    }

    /// Whether the reaction function can be negative somewhere in the domain.
    pub fn can_be_negative(self) -> bool {
        !matches!(self, SignClass::AlwaysPositive)
    }
}

/// Structural sigma-group label.
///
/// The nine groups are the pairs of `SignClass` values for (`sigma_q`,
/// `sigma_x`); the `_1` variants are the three whose `sigma_q` changes sign
/// with `s`. Those three do not exist under the Q-agreement regime.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum GroupLabel {
    #[value(name = "G1")]
    G1,
    #[value(name = "G1_1")]
    G1_1,
    #[value(name = "G2")]
    G2,
    #[value(name = "G2_1")]
    G2_1,
    #[value(name = "G3")]
    G3,
    #[value(name = "G3_1")]
    G3_1,
    #[value(name = "G4")]
    G4,
    #[value(name = "G4_1")]
    G4_1,
    #[value(name = "G5")]
    G5,
}

impl GroupLabel {
    pub const ALL: [GroupLabel; 9] = [
        GroupLabel::G1,
        GroupLabel::G1_1,
        GroupLabel::G2,
        GroupLabel::G2_1,
        GroupLabel::G3,
        GroupLabel::G3_1,
        GroupLabel::G4,
        GroupLabel::G4_1,
        GroupLabel::G5,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            GroupLabel::G1 => "G1",
            GroupLabel::G1_1 => "G1_1",
            GroupLabel::G2 => "G2",
            GroupLabel::G2_1 => "G2_1",
            GroupLabel::G3 => "G3",
            GroupLabel::G3_1 => "G3_1",
            GroupLabel::G4 => "G4",
            GroupLabel::G4_1 => "G4_1",
            GroupLabel::G5 => "G5",
        }
    }

    /// Declared classification of (`sigma_q`, `sigma_x`) for this group.
    pub fn classes(self) -> (SignClass, SignClass) {
        use SignClass::*;
        match self {
            GroupLabel::G1 => (AlwaysNegative, AlwaysNegative),
            GroupLabel::G1_1 => (SignChange, AlwaysNegative),
            GroupLabel::G2 => (AlwaysNegative, AlwaysPositive),
            GroupLabel::G2_1 => (SignChange, AlwaysPositive),
            GroupLabel::G3 => (AlwaysNegative, SignChange),
            GroupLabel::G3_1 => (SignChange, SignChange),
            GroupLabel::G4 => (AlwaysPositive, AlwaysNegative),
            GroupLabel::G4_1 => (AlwaysPositive, SignChange),
            GroupLabel::G5 => (AlwaysPositive, AlwaysPositive),
        }
    }

    /// Whether the group's `sigma_q` classification depends on `s`.
    ///
    /// Under the Q-agreement regime `sigma_q` is `s`-invariant, so these
    /// groups are undefined there.
    pub fn sigma_q_varies_with_s(self) -> bool {
        self.classes().0 == SignClass::SignChange
    }
}

/// Sign pattern of an indicator function over the full `s` scan.
///
/// Values at `s` where the evaluator is undefined are skipped. A scan with
/// zeros mixed into either sign classifies as `Mixed`; a scan with no
/// defined value at all classifies (vacuously) as `AllZero`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPattern {
    AllPositive,
    AllNegative,
    Mixed,
    AllZero,
}

impl SignPattern {
    pub const ALL: [SignPattern; 4] = [
        SignPattern::AllPositive,
        SignPattern::AllNegative,
        SignPattern::Mixed,
        SignPattern::AllZero,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            SignPattern::AllPositive => "all-positive",
            SignPattern::AllNegative => "all-negative",
            SignPattern::Mixed => "mixed",
            SignPattern::AllZero => "all-zero",
        }
    }

    /// One-character label for compact tables.
    pub fn short_label(self) -> &'static str {
        match self {
            SignPattern::AllPositive => "+",
            SignPattern::AllNegative => "-",
            SignPattern::Mixed => "~",
            SignPattern::AllZero => "0",
        }
    }
}

/// A partial parameter vector, before the cross-effect is resolved.
///
/// This is what the bound functions see: the sampled primitives, the pinned
/// or sampled curvature coefficients, the regime-derived scalar `d`, and the
/// coalition cap `n` as a float.
#[derive(Debug, Clone, Copy)]
pub struct ParameterDraw {
    pub a: f64,
    pub b: f64,
    pub m: f64,
    pub g: f64,
    pub alpha: f64,
    pub beta: f64,
    pub d: f64,
    pub n: f64,
}

/// A fully resolved parameter vector.
///
/// Immutable once assembled; coalition-size substitution copies the set via
/// [`ParameterSet::with_size`]. Invariant: `gamma_squared == gamma * gamma`
/// exactly (the square is recomputed from the rounded root at construction).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ParameterSet {
    pub a: f64,
    pub b: f64,
    pub m: f64,
    pub g: f64,
    pub alpha: f64,
    pub beta: f64,
    pub d: f64,
    pub n: f64,
    pub gamma: f64,
    pub gamma_squared: f64,
    /// Coalition size, integer in `[1, n_max]`.
    pub s: u32,
}

impl ParameterSet {
    /// Resolve a draw into a full parameter set with `s = 1`.
    pub fn from_draw(draw: ParameterDraw, gamma_squared: f64, sign: GammaSign) -> Self {
        let gamma = sign.apply(gamma_squared.sqrt());
        Self {
            a: draw.a,
            b: draw.b,
            m: draw.m,
            g: draw.g,
            alpha: draw.alpha,
            beta: draw.beta,
            d: draw.d,
            n: draw.n,
            gamma,
            // Recomputed from the rounded root so the invariant is exact.
            gamma_squared: gamma * gamma,
            s: 1,
        }
    }

    /// Copy of this parameter set with the coalition size substituted.
    pub fn with_size(mut self, s: u32) -> Self {
        self.s = s;
        self
    }

    /// Project back to the partial vector seen by the bound functions.
    pub fn draw(&self) -> ParameterDraw {
        ParameterDraw {
            a: self.a,
            b: self.b,
            m: self.m,
            g: self.g,
            alpha: self.alpha,
            beta: self.beta,
            d: self.d,
            n: self.n,
        }
    }
}

/// Coordinates of one sampling cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellKey {
    pub round: RoundId,
    pub regime: Regime,
    pub group: GroupLabel,
    pub sign: GammaSign,
}

impl CellKey {
    /// Compact label for terminal tables, e.g. `I/full/G1_1/-`.
    pub fn label(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.round.display_name(),
            self.regime.display_name(),
            self.group.display_name(),
            self.sign.display_name()
        )
    }
}

/// An accepted parameter set with its stability-scan results attached.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidSample {
    pub cell: CellKey,
    pub params: ParameterSet,
    /// Largest internally-stable coalition size, if any.
    pub stable_size: Option<u32>,
    /// Improvement index (percent) at the stable size; `None` when no stable
    /// size exists or the evaluator is undefined there.
    pub improvement: Option<f64>,
    /// Sign classification of the six auxiliary indicators.
    pub indicators: [SignPattern; 6],
}

/// A full run's configuration as understood by the pipeline.
///
/// This is derived from CLI flags (plus defaults).
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub rounds: Vec<RoundId>,
    pub regimes: Vec<Regime>,
    /// Valid samples to accept per cell.
    pub target_count: usize,
    /// Per-group overrides of `target_count`.
    pub group_targets: Vec<(GroupLabel, usize)>,
    /// Total draw budget per cell before the cell reports exhaustion.
    pub max_attempts: u64,
    pub n_max: u32,
    /// Ceiling for curvature coefficients on always-positive axes.
    pub max_sp: f64,
    /// Base RNG seed; each cell derives its own stream from this.
    pub seed: u64,
    pub export_samples: Option<PathBuf>,
    pub export_run: Option<PathBuf>,
}

impl ScanConfig {
    /// Quota for a cell of the given group.
    pub fn target_for(&self, label: GroupLabel) -> usize {
        self.group_targets
            .iter()
            .find(|(l, _)| *l == label)
            .map(|(_, n)| *n)
            .unwrap_or(self.target_count)
    }

    pub fn validate(&self) -> Result<(), crate::error::AppError> {
        use crate::error::AppError;

        if self.rounds.is_empty() {
            return Err(AppError::config("No rounds selected."));
        }
        if self.regimes.is_empty() {
            return Err(AppError::config("No agreement regimes selected."));
        }
        if self.target_count == 0 {
            return Err(AppError::config("Target sample count must be > 0."));
        }
        if self.max_attempts < self.target_count as u64 {
            return Err(AppError::config(format!(
                "Attempt budget {} cannot reach target count {}.",
                self.max_attempts, self.target_count
            )));
        }
        for (label, target) in &self.group_targets {
            if *target == 0 || self.max_attempts < *target as u64 {
                return Err(AppError::config(format!(
                    "Invalid target count {} for group {}.",
                    target,
                    label.display_name()
                )));
            }
        }
        if self.n_max < 1 {
            return Err(AppError::config("n_max must be >= 1."));
        }
        if !(self.max_sp.is_finite() && self.max_sp > 0.0 && self.max_sp <= 1.0) {
            return Err(AppError::config(format!(
                "Invalid small-coefficient ceiling: {} (must be finite, in (0, 1]).",
                self.max_sp
            )));
        }
        Ok(())
    }
}

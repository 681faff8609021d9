//! Run aggregation and formatted terminal output.
//!
//! Formatting stays in one place so:
//! - the sampling/search code stays clean and testable
//! - output changes are localized (important for future snapshot tests)

pub mod format;

pub use format::*;

use serde::Serialize;

use crate::domain::{CellKey, ValidSample};

/// What happened to one sampling cell.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CellOutcome {
    /// The cell reached its quota.
    Completed { samples: Vec<ValidSample> },
    /// The cell spent its whole attempt budget first.
    Exhausted { accepted: usize },
}

/// Per-cell result, success or failure, with the attempts spent either way.
#[derive(Debug, Clone, Serialize)]
pub struct CellReport {
    pub cell: CellKey,
    pub attempts: u64,
    pub outcome: CellOutcome,
}

impl CellReport {
    pub fn samples(&self) -> &[ValidSample] {
        match &self.outcome {
            CellOutcome::Completed { samples } => samples,
            CellOutcome::Exhausted { .. } => &[],
        }
    }

    pub fn is_exhausted(&self) -> bool {
        matches!(self.outcome, CellOutcome::Exhausted { .. })
    }
}

/// All computed outputs of a single scan run, in plan order.
#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    pub reports: Vec<CellReport>,
}

impl ScanOutput {
    pub fn exhausted_cells(&self) -> usize {
        self.reports.iter().filter(|r| r.is_exhausted()).count()
    }

    pub fn total_samples(&self) -> usize {
        self.reports.iter().map(|r| r.samples().len()).sum()
    }

    pub fn total_attempts(&self) -> u64 {
        self.reports.iter().map(|r| r.attempts).sum()
    }

    /// All accepted samples across cells, in plan order.
    pub fn samples(&self) -> impl Iterator<Item = &ValidSample> {
        self.reports.iter().flat_map(|r| r.samples().iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GammaSign, GroupLabel, Regime, RoundId};

    fn key() -> CellKey {
        CellKey {
            round: RoundId::I,
            regime: Regime::Full,
            group: GroupLabel::G1,
            sign: GammaSign::Positive,
        }
    }

    #[test]
    fn exhausted_cells_carry_no_samples() {
        let report = CellReport {
            cell: key(),
            attempts: 1000,
            outcome: CellOutcome::Exhausted { accepted: 3 },
        };
        assert!(report.is_exhausted());
        assert!(report.samples().is_empty());
    }

    #[test]
    fn output_tallies_sum_over_cells() {
        let output = ScanOutput {
            reports: vec![
                CellReport {
                    cell: key(),
                    attempts: 10,
                    outcome: CellOutcome::Completed { samples: vec![] },
                },
                CellReport {
                    cell: key(),
                    attempts: 25,
                    outcome: CellOutcome::Exhausted { accepted: 0 },
                },
            ],
        };
        assert_eq!(output.total_attempts(), 35);
        assert_eq!(output.exhausted_cells(), 1);
        assert_eq!(output.total_samples(), 0);
    }
}

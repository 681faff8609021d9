//! Shared scan pipeline used by the `scan` and `cell` front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! plan cells -> sample each cell -> stability-scan each accepted draw ->
//! aggregate per-cell reports
//!
//! Cells are independent and stateless with respect to one another, so the
//! plan is processed with rayon; the registry, restriction lists, and model
//! library are shared read-only.

use rayon::prelude::*;

use crate::domain::{CellKey, GammaSign, ScanConfig};
use crate::error::AppError;
use crate::groups::{Restrictions, SigmaGroupRegistry};
use crate::model::ModelLibrary;
use crate::report::{CellOutcome, CellReport, ScanOutput};
use crate::sampler::sample_cell;
use crate::search::evaluate_sample;

/// Enumerate every feasible cell for this configuration, in deterministic
/// plan order (round, regime, group, sign).
///
/// Groups a round cannot produce (a pinned coefficient forces the axis
/// non-negative) are planned out rather than attempted and failed.
pub fn plan_cells(config: &ScanConfig, registry: &SigmaGroupRegistry) -> Vec<CellKey> {
    let mut cells = Vec::new();
    for &round in &config.rounds {
        for &regime in &config.regimes {
            for def in registry.feasible(regime, round) {
                for sign in GammaSign::ALL {
                    cells.push(CellKey {
                        round,
                        regime,
                        group: def.label,
                        sign,
                    });
                }
            }
        }
    }
    cells
}

/// Run one cell to completion or exhaustion.
///
/// Fails only on configuration errors (regime/label mismatch, a round/group
/// combination that cannot occur); exhaustion is a reported outcome, not an
/// error.
pub fn run_cell(
    cell: &CellKey,
    registry: &SigmaGroupRegistry,
    restrictions: &Restrictions,
    models: &ModelLibrary,
    config: &ScanConfig,
) -> Result<CellReport, AppError> {
    let group = registry.group(cell.regime, cell.group)?;
    if !group.feasible_in(cell.round) {
        return Err(AppError::config(format!(
            "Group {} needs a curvature coefficient that round {} pins to zero.",
            cell.group.display_name(),
            cell.round.display_name()
        )));
    }

    let model = models.regime(cell.regime);
    let cell_restrictions = restrictions.for_cell(cell.regime, cell.sign);

    match sample_cell(cell, group, cell_restrictions, model.derive_d, config) {
        Ok(samples) => {
            let evaluated = samples
                .accepted
                .iter()
                .map(|acc| evaluate_sample(*cell, acc.params, &model.evaluators, config.n_max))
                .collect();
            Ok(CellReport {
                cell: *cell,
                attempts: samples.attempts,
                outcome: CellOutcome::Completed { samples: evaluated },
            })
        }
        Err(exhausted) => Ok(CellReport {
            cell: *cell,
            attempts: exhausted.attempts,
            outcome: CellOutcome::Exhausted {
                accepted: exhausted.accepted,
            },
        }),
    }
}

/// Execute the full scan and return the per-cell reports in plan order.
pub fn run_scan(
    config: &ScanConfig,
    registry: &SigmaGroupRegistry,
    restrictions: &Restrictions,
    models: &ModelLibrary,
) -> Result<ScanOutput, AppError> {
    config.validate()?;
    let cells = plan_cells(config, registry);
    let reports = cells
        .par_iter()
        .map(|cell| run_cell(cell, registry, restrictions, models, config))
        .collect::<Result<Vec<CellReport>, AppError>>()?;
    Ok(ScanOutput { reports })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        GroupLabel, ParameterDraw, Regime, RoundId, DEFAULT_MAX_SP, DEFAULT_N_MAX,
    };
    use crate::model::reference;

    fn config(rounds: Vec<RoundId>, target: usize, budget: u64) -> ScanConfig {
        ScanConfig {
            rounds,
            regimes: Regime::ALL.to_vec(),
            target_count: target,
            group_targets: vec![],
            max_attempts: budget,
            n_max: DEFAULT_N_MAX,
            max_sp: DEFAULT_MAX_SP,
            seed: 42,
            export_samples: None,
            export_run: None,
        }
    }

    #[test]
    fn default_plan_covers_fifty_six_cells() {
        let registry = reference::standard_registry(DEFAULT_MAX_SP).unwrap();
        let config = config(RoundId::ALL.to_vec(), 5, 50_000);
        let cells = plan_cells(&config, &registry);
        assert_eq!(cells.len(), 56);

        // Round IV keeps only the all-positive group in either regime.
        let round_iv: Vec<&CellKey> = cells
            .iter()
            .filter(|c| c.round == RoundId::IV)
            .collect();
        assert_eq!(round_iv.len(), 4);
        assert!(round_iv.iter().all(|c| c.group == GroupLabel::G5));

        // The three s-dependent sigma_q groups never appear under Q.
        assert!(cells
            .iter()
            .filter(|c| c.regime == Regime::Q)
            .all(|c| !c.group.sigma_q_varies_with_s()));
    }

    #[test]
    fn requesting_an_undefined_cell_is_a_config_error() {
        let registry = reference::standard_registry(DEFAULT_MAX_SP).unwrap();
        let restrictions = reference::standard_restrictions();
        let models = reference::models();
        let config = config(RoundId::ALL.to_vec(), 5, 50_000);

        let cell = CellKey {
            round: RoundId::I,
            regime: Regime::Q,
            group: GroupLabel::G1_1,
            sign: GammaSign::Positive,
        };
        assert!(run_cell(&cell, &registry, &restrictions, &models, &config).is_err());

        let infeasible = CellKey {
            round: RoundId::IV,
            regime: Regime::Full,
            group: GroupLabel::G1,
            sign: GammaSign::Positive,
        };
        assert!(run_cell(&infeasible, &registry, &restrictions, &models, &config).is_err());
    }

    #[test]
    fn one_exhausted_cell_does_not_abort_the_others() {
        fn negative_cap(_d: &ParameterDraw) -> f64 {
            -1.0
        }
        let registry = reference::standard_registry(DEFAULT_MAX_SP).unwrap();
        // Positive-sign cells get an unsatisfiable restriction; negative-sign
        // cells keep the uniqueness bound and complete normally.
        let restrictions = crate::groups::Restrictions::new(
            vec![negative_cap],
            vec![reference::uniqueness],
            vec![negative_cap],
            vec![reference::uniqueness],
        );
        let models = reference::models();
        let config = config(vec![RoundId::IV], 3, 300);

        let output = run_scan(&config, &registry, &restrictions, &models).unwrap();
        assert_eq!(output.reports.len(), 4);
        assert_eq!(output.exhausted_cells(), 2);
        for report in &output.reports {
            match report.cell.sign {
                GammaSign::Positive => assert!(report.is_exhausted()),
                GammaSign::Negative => {
                    assert_eq!(report.samples().len(), 3);
                }
            }
        }
    }

    #[test]
    fn scan_output_preserves_plan_order() {
        let registry = reference::standard_registry(DEFAULT_MAX_SP).unwrap();
        let restrictions = reference::standard_restrictions();
        let models = reference::models();
        let config = config(vec![RoundId::IV], 2, 50_000);

        let cells = plan_cells(&config, &registry);
        let output = run_scan(&config, &registry, &restrictions, &models).unwrap();
        let reported: Vec<CellKey> = output.reports.iter().map(|r| r.cell).collect();
        assert_eq!(cells, reported);
    }

    #[test]
    fn scanned_samples_carry_full_records() {
        let registry = reference::standard_registry(DEFAULT_MAX_SP).unwrap();
        let restrictions = reference::standard_restrictions();
        let models = reference::models();
        let config = config(vec![RoundId::I], 4, 200_000);

        let output = run_scan(&config, &registry, &restrictions, &models).unwrap();
        assert_eq!(output.exhausted_cells(), 0);
        for sample in output.samples() {
            assert_eq!(
                sample.params.gamma * sample.params.gamma,
                sample.params.gamma_squared
            );
            if let Some(star) = sample.stable_size {
                assert!((1..=DEFAULT_N_MAX).contains(&star));
                assert!(sample.improvement.is_some());
            } else {
                assert!(sample.improvement.is_none());
            }
        }
    }
}

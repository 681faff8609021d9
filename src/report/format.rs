//! Terminal formatting for scan results and registry listings.

use crate::domain::{ScanConfig, SignPattern, ValidSample};
use crate::groups::SigmaGroupRegistry;
use crate::model::{DomainError, EvaluatorSet, INDICATOR_COUNT};
use crate::report::{CellOutcome, CellReport, ScanOutput};

/// Format the full run summary (header + per-cell table + tallies).
pub fn format_run_summary(
    output: &ScanOutput,
    config: &ScanConfig,
    indicator_names: &[&str; INDICATOR_COUNT],
) -> String {
    let mut out = String::new();

    out.push_str("=== cscan - coalition stability region scan ===\n");
    out.push_str(&format!(
        "Rounds: {} | Regimes: {}\n",
        join(config.rounds.iter().map(|r| r.display_name())),
        join(config.regimes.iter().map(|r| r.display_name())),
    ));
    out.push_str(&format!(
        "Target: {}/cell | budget {} draws/cell | seed {} | n_max {}\n\n",
        config.target_count, config.max_attempts, config.seed, config.n_max
    ));

    out.push_str(&format!(
        "{:<22} {:>8} {:>9} {:>8} {:>8}  {}\n",
        "cell", "accepted", "attempts", "accept%", "stable", "s* range"
    ));
    for report in &output.reports {
        out.push_str(&format_cell_row(report, config.target_for(report.cell.group)));
    }

    let exhausted = output.exhausted_cells();
    out.push_str(&format!(
        "\nCells: {} planned | {} completed | {} exhausted\n",
        output.reports.len(),
        output.reports.len() - exhausted,
        exhausted
    ));
    let attempts = output.total_attempts();
    out.push_str(&format!(
        "Samples: {} | draws: {} | overall acceptance {}\n",
        output.total_samples(),
        attempts,
        format_rate(output.total_samples() as u64, attempts)
    ));

    out.push_str("\nIndicator sign patterns:\n");
    for (idx, name) in indicator_names.iter().enumerate() {
        let mut counts = [0usize; SignPattern::ALL.len()];
        for sample in output.samples() {
            let pattern = sample.indicators[idx];
            let slot = SignPattern::ALL.iter().position(|p| *p == pattern);
            if let Some(slot) = slot {
                counts[slot] += 1;
            }
        }
        out.push_str(&format!("  {name:<12}"));
        for (pattern, count) in SignPattern::ALL.iter().zip(counts.iter()) {
            out.push_str(&format!(" {}={count:<6}", pattern.short_label()));
        }
        out.push('\n');
    }

    out
}

fn format_cell_row(report: &CellReport, target: usize) -> String {
    match &report.outcome {
        CellOutcome::Completed { samples } => {
            let stable: Vec<u32> = samples.iter().filter_map(|s| s.stable_size).collect();
            let range = match (stable.iter().min(), stable.iter().max()) {
                (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
                _ => "-".to_string(),
            };
            format!(
                "{:<22} {:>8} {:>9} {:>8} {:>8}  {}\n",
                report.cell.label(),
                samples.len(),
                report.attempts,
                format_rate(samples.len() as u64, report.attempts),
                format!("{}/{}", stable.len(), samples.len()),
                range
            )
        }
        CellOutcome::Exhausted { accepted } => format!(
            "{:<22} {:>8} {:>9}  EXHAUSTED ({accepted}/{target} accepted)\n",
            report.cell.label(),
            accepted,
            report.attempts
        ),
    }
}

/// Per-sample detail lines for the single-cell debug command.
///
/// Equilibrium levels are printed at the stable size; `-` marks an absent
/// stable size or an evaluator that is undefined there.
pub fn format_cell_detail(report: &CellReport, evaluators: &EvaluatorSet) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "cell {} | attempts {}\n",
        report.cell.label(),
        report.attempts
    ));
    if let CellOutcome::Exhausted { accepted } = &report.outcome {
        out.push_str(&format!("EXHAUSTED with {accepted} accepted\n"));
        return out;
    }

    for (idx, sample) in report.samples().iter().enumerate() {
        out.push_str(&format!("#{:03} {}\n", idx + 1, format_sample_line(sample, evaluators)));
    }
    out
}

fn format_sample_line(sample: &ValidSample, evaluators: &EvaluatorSet) -> String {
    let p = &sample.params;
    let at_star = sample.stable_size.map(|s| p.with_size(s));
    let q_level = at_star.map(|p| (evaluators.q_level)(&p));
    let x_level = at_star.map(|p| (evaluators.x_level)(&p));

    let signs: String = sample
        .indicators
        .iter()
        .map(|pattern| pattern.short_label())
        .collect();

    format!(
        "s*={} imp={} q={} x={} ind={} | a={:.4} b={:.4} m={:.4} g={:.4} alpha={:.3e} beta={:.3e} gamma={:+.6}",
        sample
            .stable_size
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string()),
        sample
            .improvement
            .map(|v| format!("{v:.2}%"))
            .unwrap_or_else(|| "-".to_string()),
        format_level(q_level),
        format_level(x_level),
        signs,
        p.a,
        p.b,
        p.m,
        p.g,
        p.alpha,
        p.beta,
        p.gamma,
    )
}

fn format_level(level: Option<Result<f64, DomainError>>) -> String {
    match level {
        Some(Ok(value)) => format!("{value:.4}"),
        _ => "-".to_string(),
    }
}

/// Listing of the registry for the `groups` command.
pub fn format_group_table(registry: &SigmaGroupRegistry) -> String {
    let mut out = String::new();
    for regime in crate::domain::Regime::ALL {
        out.push_str(&format!("Regime {}:\n", regime.display_name()));
        out.push_str(&format!(
            "  {:<6} {:<16} {:<16} {:>10} {:>10} {:>5} {:>5}\n",
            "group", "sigma_q", "sigma_x", "max_alpha", "max_beta", "#max", "#min"
        ));
        for def in registry.groups(regime) {
            out.push_str(&format!(
                "  {:<6} {:<16} {:<16} {:>10.1e} {:>10.1e} {:>5} {:>5}\n",
                def.label.display_name(),
                def.sigma_q.display_name(),
                def.sigma_x.display_name(),
                def.max_alpha,
                def.max_beta,
                def.max_funcs.len(),
                def.min_funcs.len()
            ));
        }
        out.push('\n');
    }
    out
}

fn format_rate(hits: u64, total: u64) -> String {
    if total == 0 {
        return "-".to_string();
    }
    format!("{:.1}%", 100.0 * hits as f64 / total as f64)
}

fn join<'a>(items: impl Iterator<Item = &'a str>) -> String {
    items.collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        CellKey, GammaSign, GroupLabel, ParameterDraw, ParameterSet, Regime, RoundId,
        DEFAULT_MAX_SP, DEFAULT_N_MAX,
    };
    use crate::model::reference;

    fn sample() -> ValidSample {
        let draw = ParameterDraw {
            a: 0.4,
            b: 0.6,
            m: 0.25,
            g: 0.5,
            alpha: 0.1,
            beta: 0.2,
            d: 0.4,
            n: DEFAULT_N_MAX as f64,
        };
        ValidSample {
            cell: CellKey {
                round: RoundId::I,
                regime: Regime::Full,
                group: GroupLabel::G1,
                sign: GammaSign::Positive,
            },
            params: ParameterSet::from_draw(draw, 0.01, GammaSign::Positive),
            stable_size: Some(4),
            improvement: Some(1.5),
            indicators: [SignPattern::AllPositive; 6],
        }
    }

    #[test]
    fn summary_mentions_exhausted_cells() {
        let report = CellReport {
            cell: sample().cell,
            attempts: 500,
            outcome: CellOutcome::Exhausted { accepted: 2 },
        };
        let output = ScanOutput {
            reports: vec![report],
        };
        let config = ScanConfig {
            rounds: vec![RoundId::I],
            regimes: vec![Regime::Full],
            target_count: 50,
            group_targets: vec![],
            max_attempts: 500,
            n_max: DEFAULT_N_MAX,
            max_sp: DEFAULT_MAX_SP,
            seed: 1,
            export_samples: None,
            export_run: None,
        };
        let text = format_run_summary(&output, &config, &reference::INDICATOR_NAMES);
        assert!(text.contains("EXHAUSTED (2/50 accepted)"));
        assert!(text.contains("1 exhausted"));
    }

    #[test]
    fn detail_line_handles_missing_stable_size() {
        let mut sample = sample();
        sample.stable_size = None;
        sample.improvement = None;
        let report = CellReport {
            cell: sample.cell,
            attempts: 10,
            outcome: CellOutcome::Completed {
                samples: vec![sample],
            },
        };
        let evaluators = &reference::models().full.evaluators;
        let text = format_cell_detail(&report, evaluators);
        assert!(text.contains("s*=- imp=- q=- x=-"));
    }
}

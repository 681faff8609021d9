//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - builds the registry, restriction lists, and model library
//! - runs the scan pipeline
//! - prints reports
//! - writes optional exports

use clap::Parser;

use crate::cli::{CellArgs, Command, ScanArgs};
use crate::domain::{CellKey, GroupLabel, Regime, RoundId, ScanConfig};
use crate::error::AppError;
use crate::model::reference;

pub mod pipeline;

/// Entry point for the `cscan` binary.
pub fn run() -> Result<(), AppError> {
    // We want bare `cscan` (and `cscan -t 20`) to behave like `cscan scan ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of
    // the argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Scan(args) => handle_scan(args),
        Command::Cell(args) => handle_cell(args),
        Command::Groups => handle_groups(),
    }
}

fn handle_scan(args: ScanArgs) -> Result<(), AppError> {
    let config = scan_config_from_args(&args)?;
    config.validate()?;

    let registry = reference::standard_registry(config.max_sp)?;
    let restrictions = reference::standard_restrictions();
    let models = reference::models();

    let output = pipeline::run_scan(&config, &registry, &restrictions, &models)?;

    println!(
        "{}",
        crate::report::format_run_summary(&output, &config, &reference::INDICATOR_NAMES)
    );

    if let Some(path) = &config.export_samples {
        crate::io::write_samples_csv(path, &output, &reference::INDICATOR_NAMES)?;
    }
    if let Some(path) = &config.export_run {
        crate::io::write_run_json(path, &output)?;
    }

    // Exhausted cells are per-cell failures: they never abort the run, but
    // the exit code has to make them visible to the operator.
    let exhausted = output.exhausted_cells();
    if exhausted > 0 {
        return Err(AppError::new(
            1,
            format!(
                "{exhausted} of {} cells exhausted their attempt budget.",
                output.reports.len()
            ),
        ));
    }
    Ok(())
}

fn handle_cell(args: CellArgs) -> Result<(), AppError> {
    let cell = CellKey {
        round: args.round,
        regime: args.regime,
        group: args.group,
        sign: args.sign,
    };
    let config = ScanConfig {
        rounds: vec![args.round],
        regimes: vec![args.regime],
        target_count: args.target,
        group_targets: vec![],
        max_attempts: args.max_attempts,
        n_max: args.n_max,
        max_sp: args.max_sp,
        seed: args.seed,
        export_samples: None,
        export_run: None,
    };
    config.validate()?;

    let registry = reference::standard_registry(config.max_sp)?;
    let restrictions = reference::standard_restrictions();
    let models = reference::models();

    let report = pipeline::run_cell(&cell, &registry, &restrictions, &models, &config)?;
    let evaluators = &models.regime(cell.regime).evaluators;
    println!("{}", crate::report::format_cell_detail(&report, evaluators));

    if report.is_exhausted() {
        return Err(AppError::new(1, "Cell exhausted its attempt budget."));
    }
    Ok(())
}

fn handle_groups() -> Result<(), AppError> {
    let registry = reference::standard_registry(crate::domain::DEFAULT_MAX_SP)?;
    println!("{}", crate::report::format_group_table(&registry));
    Ok(())
}

pub fn scan_config_from_args(args: &ScanArgs) -> Result<ScanConfig, AppError> {
    let rounds = if args.rounds.is_empty() {
        RoundId::ALL.to_vec()
    } else {
        args.rounds.clone()
    };
    let regimes = match args.regime {
        Some(regime) => vec![regime],
        None => Regime::ALL.to_vec(),
    };
    let group_targets = args
        .group_targets
        .iter()
        .map(|raw| parse_group_target(raw))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ScanConfig {
        rounds,
        regimes,
        target_count: args.target,
        group_targets,
        max_attempts: args.max_attempts,
        n_max: args.n_max,
        max_sp: args.max_sp,
        seed: args.seed,
        export_samples: args.export.clone(),
        export_run: args.export_run.clone(),
    })
}

/// Parse a `GROUP=N` quota override.
fn parse_group_target(raw: &str) -> Result<(GroupLabel, usize), AppError> {
    let (name, count) = raw
        .split_once('=')
        .ok_or_else(|| AppError::config(format!("Invalid group target '{raw}' (want GROUP=N).")))?;
    let label = <GroupLabel as clap::ValueEnum>::from_str(name, false)
        .map_err(|_| AppError::config(format!("Unknown group label '{name}'.")))?;
    let count: usize = count
        .parse()
        .map_err(|_| AppError::config(format!("Invalid sample count in '{raw}'.")))?;
    Ok((label, count))
}

/// Rewrite argv so `cscan` defaults to `cscan scan`.
///
/// Rules:
/// - `cscan`                    -> `cscan scan`
/// - `cscan -t 20 ...`          -> `cscan scan -t 20 ...`
/// - `cscan --help/--version`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("scan".to_string());
        return argv;
    };

    let is_top_level_help_or_version =
        matches!(arg1.as_str(), "-h" | "--help" | "-V" | "--version" | "help");
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "scan" | "cell" | "groups");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "scan flags".
    if arg1.starts_with('-') {
        argv.insert(1, "scan".to_string());
        return argv;
    }

    // Otherwise, leave as-is (clap will report the unknown subcommand).
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_scan() {
        assert_eq!(rewrite_args(argv(&["cscan"])), argv(&["cscan", "scan"]));
        assert_eq!(
            rewrite_args(argv(&["cscan", "-t", "20"])),
            argv(&["cscan", "scan", "-t", "20"])
        );
    }

    #[test]
    fn group_target_overrides_parse_and_reject() {
        assert_eq!(
            parse_group_target("G1_1=120").unwrap(),
            (GroupLabel::G1_1, 120)
        );
        assert!(parse_group_target("G9=5").is_err());
        assert!(parse_group_target("G5").is_err());
        assert!(parse_group_target("G5=lots").is_err());
    }

    #[test]
    fn help_and_subcommands_pass_through() {
        assert_eq!(rewrite_args(argv(&["cscan", "--help"])), argv(&["cscan", "--help"]));
        assert_eq!(
            rewrite_args(argv(&["cscan", "groups"])),
            argv(&["cscan", "groups"])
        );
    }
}

//! Command-line parsing for the coalition stability scanner.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the sampling/search code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{GammaSign, GroupLabel, Regime, RoundId, DEFAULT_MAX_SP, DEFAULT_N_MAX};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "cscan",
    version,
    about = "Coalition stability region scanner (two public goods)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full scan over rounds x regimes x groups x signs and print a
    /// per-cell report.
    Scan(ScanArgs),
    /// Sample a single cell and print per-sample detail (for debugging a
    /// group's valid region).
    Cell(CellArgs),
    /// List the sigma-group registry per regime.
    Groups,
}

/// Common sampling options.
#[derive(Debug, Parser, Clone)]
pub struct ScanArgs {
    /// Valid samples to accept per cell.
    #[arg(short = 't', long, default_value_t = 50)]
    pub target: usize,

    /// Per-group quota override, e.g. `--group-target G5=200` (repeatable).
    #[arg(long = "group-target", value_name = "GROUP=N")]
    pub group_targets: Vec<String>,

    /// Total draw budget per cell before the cell reports exhaustion.
    #[arg(long, default_value_t = 200_000)]
    pub max_attempts: u64,

    /// Base RNG seed (each cell derives its own deterministic stream).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Rounds to run (repeatable); default is all four.
    #[arg(long = "round", value_enum)]
    pub rounds: Vec<RoundId>,

    /// Restrict to one agreement regime; default is both.
    #[arg(long, value_enum)]
    pub regime: Option<Regime>,

    /// Upper end of the coalition-size domain.
    #[arg(long, default_value_t = DEFAULT_N_MAX)]
    pub n_max: u32,

    /// Ceiling for curvature coefficients on always-positive axes.
    #[arg(long, default_value_t = DEFAULT_MAX_SP)]
    pub max_sp: f64,

    /// Export per-sample results to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the full run report (per-cell outcomes) to JSON.
    #[arg(long = "export-run")]
    pub export_run: Option<PathBuf>,
}

/// Options for sampling a single cell.
#[derive(Debug, Parser)]
pub struct CellArgs {
    /// Round (I, II, III, IV).
    #[arg(value_enum)]
    pub round: RoundId,

    /// Agreement regime.
    #[arg(value_enum)]
    pub regime: Regime,

    /// Sigma-group label.
    #[arg(value_enum)]
    pub group: GroupLabel,

    /// Cross-effect sign.
    #[arg(value_enum)]
    pub sign: GammaSign,

    /// Valid samples to accept.
    #[arg(short = 't', long, default_value_t = 10)]
    pub target: usize,

    /// Total draw budget before reporting exhaustion.
    #[arg(long, default_value_t = 200_000)]
    pub max_attempts: u64,

    /// Base RNG seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Upper end of the coalition-size domain.
    #[arg(long, default_value_t = DEFAULT_N_MAX)]
    pub n_max: u32,

    /// Ceiling for curvature coefficients on always-positive axes.
    #[arg(long, default_value_t = DEFAULT_MAX_SP)]
    pub max_sp: f64,
}

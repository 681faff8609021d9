//! Rejection sampling of valid parameter vectors, one cell at a time.
//!
//! A cell is a (round, regime, group, sign) combination. Each cell draws
//! primitives uniformly, asks the bound engine for the admissible
//! `gamma_squared` interval, and keeps resampling until it has accepted its
//! quota or spent its attempt budget. No partial state survives a rejected
//! draw.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Uniform;

use crate::bounds::{admissible_interval, GammaInterval};
use crate::domain::{CellKey, ParameterDraw, ParameterSet, ScanConfig};
use crate::groups::SigmaGroupDef;
use crate::model::{BoundFn, DeriveFn};

/// One accepted draw, with the interval it was drawn from (kept for
/// diagnostics and re-checking).
#[derive(Debug, Clone, Copy)]
pub struct Accepted {
    pub params: ParameterSet,
    pub interval: GammaInterval,
}

/// A completed cell: the quota of accepted draws plus the attempts spent.
#[derive(Debug, Clone)]
pub struct CellSamples {
    pub accepted: Vec<Accepted>,
    pub attempts: u64,
}

/// The cell spent its whole attempt budget without reaching its quota.
///
/// Some (round, group) combinations have a vanishing valid region; this
/// diagnostic is surfaced per cell rather than looping forever or aborting
/// the run.
#[derive(Debug, Clone, Copy)]
pub struct Exhausted {
    pub attempts: u64,
    pub accepted: usize,
}

/// Sample one cell to its quota.
pub fn sample_cell(
    cell: &CellKey,
    group: &SigmaGroupDef,
    restrictions: &[BoundFn],
    derive_d: DeriveFn,
    config: &ScanConfig,
) -> Result<CellSamples, Exhausted> {
    let target = config.target_for(cell.group);
    let mut rng = StdRng::seed_from_u64(cell_seed(cell, config.seed));
    let mut accepted = Vec::with_capacity(target);
    let mut attempts: u64 = 0;

    while accepted.len() < target {
        if attempts >= config.max_attempts {
            return Err(Exhausted {
                attempts,
                accepted: accepted.len(),
            });
        }
        attempts += 1;

        let draw = draw_primitives(&mut rng, cell, group, derive_d, config);
        let interval = match admissible_interval(&draw, group, restrictions) {
            Ok(interval) => interval,
            // Invalid draw: discard everything and retry from scratch.
            Err(_) => continue,
        };

        let gamma_squared = Uniform::new(interval.lhs, interval.rhs).sample(&mut rng);
        let params = ParameterSet::from_draw(draw, gamma_squared, cell.sign);
        accepted.push(Accepted { params, interval });
    }

    Ok(CellSamples { accepted, attempts })
}

fn draw_primitives(
    rng: &mut StdRng,
    cell: &CellKey,
    group: &SigmaGroupDef,
    derive_d: DeriveFn,
    config: &ScanConfig,
) -> ParameterDraw {
    let a = open_uniform(rng, 1.0);
    let b = open_uniform(rng, 1.0);
    let m = open_uniform(rng, 1.0);
    let g = open_uniform(rng, 1.0);

    // Pinned coefficients are exactly zero; sampled ones stay strictly
    // positive so the round's pinning scheme is recoverable from the data.
    let alpha = if cell.round.samples_alpha() {
        open_uniform(rng, group.max_alpha)
    } else {
        0.0
    };
    let beta = if cell.round.samples_beta() {
        open_uniform(rng, group.max_beta)
    } else {
        0.0
    };

    ParameterDraw {
        a,
        b,
        m,
        g,
        alpha,
        beta,
        d: derive_d(a, b, m, g),
        n: config.n_max as f64,
    }
}

/// Uniform draw on the open interval `(0, max)`.
///
/// `gen_range` samples the half-open `[0, max)`; the zero is redrawn.
fn open_uniform(rng: &mut StdRng, max: f64) -> f64 {
    loop {
        let value = rng.gen_range(0.0..max);
        if value > 0.0 {
            return value;
        }
    }
}

/// Derive a per-cell RNG seed from the base seed and the cell coordinates.
///
/// Cells are sampled on independent deterministic streams, so results do not
/// depend on scheduling order.
pub fn cell_seed(cell: &CellKey, base_seed: u64) -> u64 {
    let mut hasher = DefaultHasher::new();
    base_seed.hash(&mut hasher);
    cell.hash(&mut hasher);
    hasher.finish()
}

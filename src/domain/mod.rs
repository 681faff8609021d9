//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - cell coordinate enums (`Regime`, `RoundId`, `GroupLabel`, `GammaSign`)
//! - parameter vectors (`ParameterDraw`, `ParameterSet`)
//! - scan outputs (`ValidSample`, `SignPattern`)
//! - the run configuration (`ScanConfig`)

pub mod types;

pub use types::*;
